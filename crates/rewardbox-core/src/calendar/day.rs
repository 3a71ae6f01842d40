//! Day calculator.
//!
//! Converts a wall-clock instant and the fixed start instant into the
//! highest unlocked day. All arithmetic happens on absolute instants, so
//! every viewer sees the same transition instants no matter which zone
//! their machine runs in. The reference zone only affects how times are
//! displayed.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};

/// Number of days in the calendar.
pub const DAY_COUNT: u8 = 7;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Highest day whose reward may be revealed at `now`.
///
/// Returns 0 before `start`, saturates at [`DAY_COUNT`] from the seventh
/// elapsed day onward, and `elapsed_days + 1` in between.
pub fn unlocked_day(now: DateTime<Utc>, start: DateTime<Utc>) -> u8 {
    // `num_milliseconds` truncates toward zero, so a sub-millisecond
    // negative gap would otherwise read as day 1.
    if now < start {
        return 0;
    }
    let elapsed_ms = (now - start).num_milliseconds();
    let elapsed_days = elapsed_ms.div_euclid(MS_PER_DAY);
    if elapsed_days < 0 {
        0
    } else if elapsed_days >= i64::from(DAY_COUNT) {
        DAY_COUNT
    } else {
        elapsed_days as u8 + 1
    }
}

/// Instant at which [`unlocked_day`] next increases, or `None` once every
/// day is unlocked.
pub fn next_unlock_at(now: DateTime<Utc>, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let day = unlocked_day(now, start);
    if day >= DAY_COUNT {
        return None;
    }
    // Day `d` becomes reachable exactly `d - 1` days after start, so the
    // step from `day` to `day + 1` lands `day` days after start.
    Some(start + Duration::days(i64::from(day)))
}

/// Start instant that makes `unlocked_day(now, start) == day`.
///
/// `day` is clamped to [`DAY_COUNT`]. Day 0 puts the start one day ahead.
pub fn start_for_unlocked_day(now: DateTime<Utc>, day: u8) -> DateTime<Utc> {
    match day.min(DAY_COUNT) {
        0 => now + Duration::days(1),
        d => now - Duration::days(i64::from(d) - 1),
    }
}

/// `now` expressed in the fixed reference zone.
///
/// Offsets outside ±24h fall back to UTC.
pub fn reference_time(now: DateTime<Utc>, offset_minutes: i32) -> DateTime<FixedOffset> {
    let offset = reference_offset(offset_minutes);
    now.with_timezone(&offset)
}

/// Fixed offset for the reference zone.
pub fn reference_offset(offset_minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(offset_minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
}

/// Source of "now" for the calendar.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}
