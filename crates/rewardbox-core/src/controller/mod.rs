//! Reward calendar controller.
//!
//! [`RewardCalendar`] is the single owner of the progress record. Front
//! ends read through it and drive it with gestures and ticks; every
//! mutation goes through here so the save always happens before the call
//! returns, and a render that follows never sees a claim that is not yet
//! recorded.
//!
//! ## Usage
//!
//! ```ignore
//! let mut calendar = RewardCalendar::open_default(&config)?;
//! if let Ok(OpenOutcome::Unbox { .. }) = calendar.open(3) {
//!     let (handle, _started) = calendar.press(0).unwrap();
//!     // On every timer tick:
//!     for event in calendar.tick(handle, elapsed) { render(event) }
//!     // On release:
//!     calendar.release(0, CancelReason::Release);
//! }
//! calendar.close();
//! ```

#[cfg(feature = "admin")]
pub mod admin;

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;

use crate::availability::{self, DayCard, DayStatus};
use crate::calendar::{self, Clock, DayWatcher, SystemClock, DAY_COUNT};
use crate::catalog::{Reward, RewardCatalog};
use crate::celebration::{self, BurstPlan, CelebrationConfig};
use crate::error::{CoreError, OpenRejection, StorageError};
use crate::events::Event;
use crate::storage::{ClaimStore, Config, MemorySlot, ProgressState, SqliteSlot, StateSlot};
use crate::unlock::{
    duration_ms, CancelReason, HoldInteraction, HoldState, PointerId, TickHandle, TickOutcome,
};

/// What opening a day leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The day is available; a hold may start.
    Unbox { day: u8 },
    /// The day was claimed earlier; show its reward read-only.
    AlreadyClaimed(Reward),
}

pub struct RewardCalendar {
    catalog: RewardCatalog,
    store: ClaimStore,
    state: ProgressState,
    clock: Box<dyn Clock>,
    hold: HoldInteraction,
    watcher: DayWatcher,
    celebration: CelebrationConfig,
    rng: Mcg128Xsl64,
    primed_plan: Option<BurstPlan>,
    revealed_plan: Option<BurstPlan>,
    reference_offset_minutes: i32,
}

impl RewardCalendar {
    /// Build a calendar, loading saved progress from `store`.
    pub fn new(
        config: &Config,
        catalog: RewardCatalog,
        store: ClaimStore,
        clock: Box<dyn Clock>,
    ) -> Self {
        let state = store.load();
        let mut watcher = DayWatcher::new(config.day_poll_interval());
        watcher.observe(state.unlocked_day(clock.now()));
        let rng = match config.celebration.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };

        Self {
            catalog,
            store,
            state,
            clock,
            hold: HoldInteraction::new(config.hold_duration()),
            watcher,
            celebration: config.celebration.clone(),
            rng,
            primed_plan: None,
            revealed_plan: None,
            reference_offset_minutes: config.calendar.reference_offset_minutes,
        }
    }

    /// Calendar backed by the SQLite slot in the data directory and the
    /// wall clock.
    ///
    /// If the database cannot be opened the calendar still starts, keeping
    /// progress in memory only; claims then report `persisted: false`.
    ///
    /// # Errors
    /// Returns an error if the configured catalog cannot be loaded.
    pub fn open_default(config: &Config) -> Result<Self, CoreError> {
        let catalog = config.catalog()?;
        let store = ClaimStore::new(slot_or_memory(SqliteSlot::open()), config.default_start_utc());
        Ok(Self::new(config, catalog, store, Box::new(SystemClock)))
    }

    /// Like [`open_default`](Self::open_default), over the database at
    /// `path` and the given clock.
    pub fn open_at(config: &Config, path: &Path, clock: Box<dyn Clock>) -> Result<Self, CoreError> {
        let catalog = config.catalog()?;
        let store = ClaimStore::new(slot_or_memory(SqliteSlot::open_at(path)), config.default_start_utc());
        Ok(Self::new(config, catalog, store, clock))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn catalog(&self) -> &RewardCatalog {
        &self.catalog
    }

    pub fn hold(&self) -> &HoldInteraction {
        &self.hold
    }

    pub fn day_poll_interval(&self) -> Duration {
        self.watcher.poll_interval()
    }

    pub fn unlocked_day(&self) -> u8 {
        self.state.unlocked_day(self.now())
    }

    pub fn status(&self, day: u8) -> DayStatus {
        availability::status(day, &self.state, self.now())
    }

    pub fn board(&self) -> Vec<DayCard> {
        availability::board(&self.catalog, &self.state, self.now())
    }

    pub fn reward(&self, day: u8) -> Option<&Reward> {
        self.catalog.get(day)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let now = self.now();
        let start = self.state.start_instant();
        Event::StateSnapshot {
            unlocked_day: self.state.unlocked_day(now),
            claimed_days: self.state.claimed_days().iter().copied().collect(),
            start_instant: start,
            next_unlock_at: calendar::next_unlock_at(now, start),
            reference_time: calendar::reference_time(now, self.reference_offset_minutes),
            hold_state: self.hold.state(),
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Open the interaction for `day`.
    ///
    /// A claimed day opens read-only and can never reach `Holding`. Any
    /// hold already in progress is abandoned.
    ///
    /// # Errors
    /// Refuses days outside 1..=7 and days that are still locked; nothing
    /// changes in that case.
    pub fn open(&mut self, day: u32) -> Result<OpenOutcome, OpenRejection> {
        let day = u8::try_from(day)
            .ok()
            .filter(|d| (1..=DAY_COUNT).contains(d))
            .ok_or(OpenRejection::InvalidDay(day))?;
        let reward = self
            .catalog
            .get(day)
            .cloned()
            .ok_or(OpenRejection::InvalidDay(u32::from(day)))?;

        match self.status(day) {
            DayStatus::Claimed => {
                self.close();
                self.hold.show(day);
                Ok(OpenOutcome::AlreadyClaimed(reward))
            }
            DayStatus::Available => {
                self.close();
                self.hold.arm(day);
                Ok(OpenOutcome::Unbox { day })
            }
            DayStatus::Locked => Err(OpenRejection::Locked {
                day,
                unlocked_day: self.unlocked_day(),
            }),
        }
    }

    /// A pointer went down on the opened day.
    ///
    /// Availability is checked again here because the unlocked day can
    /// change between opening and pressing. Returns the tick handle for a
    /// newly started hold; `None` if the press was refused or joined a hold
    /// already running.
    pub fn press(&mut self, pointer: PointerId) -> Option<(TickHandle, Event)> {
        let day = self.hold.day()?;
        if self.hold.state() == HoldState::Idle && self.status(day) != DayStatus::Available {
            tracing::debug!(day, "press refused, day is not available");
            return None;
        }
        let handle = self.hold.press(pointer)?;
        tracing::debug!(day, pointer, "hold started");
        Some((
            handle,
            Event::HoldStarted {
                day,
                hold_duration_ms: duration_ms(self.hold.hold_duration()),
                at: self.now(),
            },
        ))
    }

    /// Advance the hold identified by `handle` by `delta`.
    ///
    /// Returns the events produced by this tick. On completion the claim is
    /// recorded and saved before this returns.
    pub fn tick(&mut self, handle: TickHandle, delta: Duration) -> Vec<Event> {
        let Some(day) = self.hold.day() else {
            return Vec::new();
        };
        let at = self.now();

        match self.hold.tick(handle, delta) {
            TickOutcome::Ignored => Vec::new(),
            TickOutcome::Progress {
                elapsed_ms,
                fraction,
                intensified,
                primed,
            } => {
                let mut events = vec![Event::HoldProgress {
                    day,
                    elapsed_ms,
                    fraction,
                    at,
                }];
                if let Some(intensity) = intensified {
                    events.push(Event::HoldIntensified { day, intensity, at });
                }
                if primed {
                    let plan = celebration::plan(&self.celebration, &mut self.rng);
                    events.push(Event::CelebrationPrimed {
                        day,
                        particle_count: plan.particle_count(),
                        at,
                    });
                    self.primed_plan = Some(plan);
                }
                events
            }
            TickOutcome::Completed { day, elapsed_ms } => {
                let mut events = vec![Event::HoldProgress {
                    day,
                    elapsed_ms,
                    fraction: 1.0,
                    at,
                }];
                events.extend(self.commit(day, at));
                events
            }
        }
    }

    /// A pointer lifted or left the control.
    pub fn release(&mut self, pointer: PointerId, reason: CancelReason) -> Option<Event> {
        let day = self.hold.day()?;
        let discarded_ms = self.hold.release(pointer)?;
        Some(self.cancelled(day, discarded_ms, reason))
    }

    /// End the hold whichever pointers are down (touch cancel).
    pub fn cancel(&mut self, reason: CancelReason) -> Option<Event> {
        let day = self.hold.day()?;
        let discarded_ms = self.hold.cancel()?;
        Some(self.cancelled(day, discarded_ms, reason))
    }

    /// Leave the interaction, discarding any progress and pending effects.
    pub fn close(&mut self) -> Option<Event> {
        let event = self.cancel(CancelReason::Closed);
        self.hold.close();
        self.primed_plan = None;
        self.revealed_plan = None;
        event
    }

    /// Celebration for the most recent reveal, if not taken yet.
    pub fn take_celebration(&mut self) -> Option<BurstPlan> {
        self.revealed_plan.take()
    }

    /// Re-check the unlocked day. Call every [`Self::day_poll_interval`].
    pub fn poll_day(&mut self) -> Option<Event> {
        let now = self.now();
        let change = self.watcher.observe(self.state.unlocked_day(now))?;
        tracing::info!(from = change.from, to = change.to, "unlocked day changed");
        Some(Event::DayUnlocked {
            from_day: change.from,
            to_day: change.to,
            at: now,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn cancelled(&mut self, day: u8, discarded_ms: u64, reason: CancelReason) -> Event {
        self.primed_plan = None;
        tracing::debug!(day, discarded_ms, ?reason, "hold cancelled");
        Event::HoldCancelled {
            day,
            discarded_ms,
            reason,
            at: self.now(),
        }
    }

    fn commit(&mut self, day: u8, at: DateTime<Utc>) -> Option<Event> {
        let Some(reward) = self.catalog.get(day).cloned() else {
            tracing::warn!(day, "completed hold for a day missing from the catalog");
            return None;
        };
        self.state.claim(day);
        let persisted = self.persist();
        tracing::info!(day, persisted, "reward claimed");

        let plan = self
            .primed_plan
            .take()
            .unwrap_or_else(|| celebration::plan(&self.celebration, &mut self.rng));
        self.revealed_plan = Some(plan);

        Some(Event::RewardRevealed {
            reward,
            persisted,
            at,
        })
    }

    /// Save current progress. A failed save keeps the state in memory.
    fn persist(&self) -> bool {
        match self.store.save(&self.state) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "progress kept in memory only");
                false
            }
        }
    }
}

/// The opened SQLite slot, or a memory slot that refuses writes so every
/// claim reports that it was not saved.
fn slot_or_memory(opened: Result<SqliteSlot, StorageError>) -> Box<dyn StateSlot> {
    match opened {
        Ok(slot) => Box::new(slot),
        Err(e) => {
            tracing::warn!(error = %e, "storage unavailable, progress kept in memory only");
            let slot = MemorySlot::new();
            slot.set_reject_writes(true);
            Box::new(slot)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::FixedClock;
    use crate::storage::STATE_SLOT_KEY;
    use chrono::TimeZone;

    const TICK: Duration = Duration::from_millis(50);

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 6, 0, 0).unwrap()
    }

    fn calendar_at(now: DateTime<Utc>) -> (RewardCalendar, MemorySlot, FixedClock) {
        let mut config = Config::default();
        config.celebration.seed = Some(1);
        let slot = MemorySlot::new();
        let clock = FixedClock::new(now);
        let store = ClaimStore::new(Box::new(slot.clone()), t0());
        let calendar = RewardCalendar::new(
            &config,
            RewardCatalog::default(),
            store,
            Box::new(clock.clone()),
        );
        (calendar, slot, clock)
    }

    fn hold_for(calendar: &mut RewardCalendar, handle: TickHandle, ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..ms / 50 {
            events.extend(calendar.tick(handle, TICK));
        }
        events
    }

    #[test]
    fn open_rejects_out_of_range_days() {
        let (mut calendar, _, _) = calendar_at(t0());
        assert_eq!(calendar.open(0), Err(OpenRejection::InvalidDay(0)));
        assert_eq!(calendar.open(8), Err(OpenRejection::InvalidDay(8)));
        assert_eq!(calendar.open(300), Err(OpenRejection::InvalidDay(300)));
    }

    #[test]
    fn open_rejects_locked_day() {
        let (mut calendar, _, _) = calendar_at(t0() + chrono::Duration::hours(1));
        assert_eq!(
            calendar.open(2),
            Err(OpenRejection::Locked {
                day: 2,
                unlocked_day: 1
            })
        );
        assert_eq!(calendar.hold().day(), None);
    }

    #[test]
    fn completed_hold_claims_and_saves() {
        let (mut calendar, slot, _) = calendar_at(t0() + chrono::Duration::days(2));
        assert_eq!(calendar.open(3), Ok(OpenOutcome::Unbox { day: 3 }));
        let (handle, _) = calendar.press(0).unwrap();
        let events = hold_for(&mut calendar, handle, 5000);

        assert!(matches!(
            events.last(),
            Some(Event::RewardRevealed { reward, persisted: true, .. }) if reward.day == 3
        ));
        assert!(calendar.state().is_claimed(3));
        assert_eq!(calendar.status(3), DayStatus::Claimed);
        assert!(slot.raw(STATE_SLOT_KEY).unwrap().contains("\"claimedDays\":[3]"));
        assert!(calendar.take_celebration().is_some());
        assert!(calendar.take_celebration().is_none());
    }

    #[test]
    fn nothing_is_saved_before_completion() {
        let (mut calendar, slot, _) = calendar_at(t0() + chrono::Duration::days(2));
        calendar.open(3).unwrap();
        let (handle, _) = calendar.press(0).unwrap();
        hold_for(&mut calendar, handle, 4950);
        assert!(slot.raw(STATE_SLOT_KEY).is_none());
        assert!(calendar.state().claimed_days().is_empty());
    }

    #[test]
    fn press_rechecks_availability() {
        let (mut calendar, _, clock) = calendar_at(t0() + chrono::Duration::hours(2));
        calendar.open(1).unwrap();
        // Clock moved backwards (e.g. a corrected system time) before the press.
        clock.set(t0() - chrono::Duration::hours(1));
        assert!(calendar.press(0).is_none());
        assert_eq!(calendar.hold().state(), HoldState::Idle);
    }

    #[test]
    fn hold_started_reports_configured_duration() {
        let mut config = Config::default();
        config.hold.duration_ms = 1234;
        let store = ClaimStore::new(Box::new(MemorySlot::new()), t0());
        let mut calendar = RewardCalendar::new(
            &config,
            RewardCatalog::default(),
            store,
            Box::new(FixedClock::new(t0())),
        );
        calendar.open(1).unwrap();
        let (_, started) = calendar.press(0).unwrap();
        assert!(matches!(started, Event::HoldStarted { day: 1, hold_duration_ms: 1234, .. }));
    }

    #[test]
    fn unreadable_database_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rewardbox.db");
        std::fs::write(&path, "not a database, just some bytes\n".repeat(64)).unwrap();

        let mut config = Config::default();
        config.celebration.seed = Some(1);
        let clock = FixedClock::new(t0() + chrono::Duration::days(2));
        let mut calendar = RewardCalendar::open_at(&config, &path, Box::new(clock)).unwrap();
        assert_eq!(calendar.unlocked_day(), 3);
        assert!(calendar.state().claimed_days().is_empty());

        calendar.open(2).unwrap();
        let (handle, _) = calendar.press(0).unwrap();
        let events = hold_for(&mut calendar, handle, 5000);
        assert!(matches!(
            events.last(),
            Some(Event::RewardRevealed { persisted: false, .. })
        ));
        assert!(calendar.state().is_claimed(2));
    }

    #[test]
    fn write_failure_keeps_claim_in_memory() {
        let (mut calendar, slot, _) = calendar_at(t0() + chrono::Duration::days(2));
        slot.set_reject_writes(true);
        calendar.open(1).unwrap();
        let (handle, _) = calendar.press(0).unwrap();
        let events = hold_for(&mut calendar, handle, 5000);
        assert!(matches!(
            events.last(),
            Some(Event::RewardRevealed { persisted: false, .. })
        ));
        assert!(calendar.state().is_claimed(1));
        assert!(slot.raw(STATE_SLOT_KEY).is_none());
    }

    #[test]
    fn primed_celebration_is_reused_on_reveal() {
        let (mut calendar, _, _) = calendar_at(t0());
        calendar.open(1).unwrap();
        let (handle, _) = calendar.press(0).unwrap();
        let events = hold_for(&mut calendar, handle, 5000);
        let primed = events
            .iter()
            .filter(|e| matches!(e, Event::CelebrationPrimed { .. }))
            .count();
        assert_eq!(primed, 1);
        assert_eq!(calendar.take_celebration().unwrap().particle_count(), 105);
    }

    #[test]
    fn close_mid_hold_cancels_and_resets() {
        let (mut calendar, _, _) = calendar_at(t0());
        calendar.open(1).unwrap();
        let (handle, _) = calendar.press(0).unwrap();
        hold_for(&mut calendar, handle, 3000);
        assert!(matches!(
            calendar.close(),
            Some(Event::HoldCancelled {
                reason: CancelReason::Closed,
                discarded_ms: 3000,
                ..
            })
        ));
        assert!(calendar.tick(handle, TICK).is_empty());
        calendar.open(1).unwrap();
        assert_eq!(calendar.hold().elapsed_ms(), 0);
        assert!(calendar.close().is_none());
    }

    #[test]
    fn poll_day_reports_new_day_once() {
        let (mut calendar, _, clock) = calendar_at(t0() + chrono::Duration::hours(23));
        assert!(calendar.poll_day().is_none());
        clock.advance(chrono::Duration::hours(2));
        assert!(matches!(
            calendar.poll_day(),
            Some(Event::DayUnlocked {
                from_day: 1,
                to_day: 2,
                ..
            })
        ));
        assert!(calendar.poll_day().is_none());
    }
}
