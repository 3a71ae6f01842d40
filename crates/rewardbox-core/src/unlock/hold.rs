//! Hold-to-unlock state machine.
//!
//! The interaction does not own a timer. Entering `Holding` hands the caller
//! a [`TickHandle`]; the caller schedules ticks with it and feeds the elapsed
//! time back through [`HoldInteraction::tick`]. Every exit from `Holding`
//! invalidates the handle, so a tick that was already queued when the user
//! let go is ignored instead of advancing a closed interaction.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --press--> Holding --tick (elapsed >= hold)--> Completed
//!  ^                 |
//!  +--release/leave--+
//!
//! show(day) --> Viewing        (already claimed, read-only)
//! close()   --> Idle, no day
//! ```
//!
//! Nothing here touches claim state. Reaching `Completed` is reported as
//! [`TickOutcome::Completed`] and the owner performs the commit.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::HoldIntensity;

/// Identifies one pointer or touch point.
pub type PointerId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldState {
    Idle,
    Holding,
    Completed,
    /// Showing an already-claimed reward. Holding is unreachable.
    Viewing,
}

/// Why a hold ended early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    Release,
    PointerLeave,
    TouchCancel,
    Closed,
}

/// Ticket for the tick source of one hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle {
    generation: u64,
}

/// Result of feeding one tick to the interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Stale handle, or not holding.
    Ignored,
    Progress {
        elapsed_ms: u64,
        fraction: f64,
        /// Set when this tick raised the intensity level.
        intensified: Option<HoldIntensity>,
        /// Set once per hold, on the tick that first reaches half way.
        primed: bool,
    },
    /// The hold reached its full duration. The handle is now dead.
    Completed { day: u8, elapsed_ms: u64 },
}

#[derive(Debug, Clone)]
pub struct HoldInteraction {
    day: Option<u8>,
    state: HoldState,
    hold_ms: u64,
    elapsed_ms: u64,
    generation: u64,
    active: Option<TickHandle>,
    pointers: BTreeSet<PointerId>,
    intensity: HoldIntensity,
    primed: bool,
}

impl HoldInteraction {
    pub fn new(hold_duration: Duration) -> Self {
        Self {
            day: None,
            state: HoldState::Idle,
            hold_ms: duration_ms(hold_duration).max(1),
            elapsed_ms: 0,
            generation: 0,
            active: None,
            pointers: BTreeSet::new(),
            intensity: HoldIntensity::Calm,
            primed: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> HoldState {
        self.state
    }

    pub fn day(&self) -> Option<u8> {
        self.day
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn hold_duration(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }

    pub fn intensity(&self) -> HoldIntensity {
        self.intensity
    }

    /// 0.0 .. 1.0 progress of the current hold.
    pub fn fraction(&self) -> f64 {
        (self.elapsed_ms as f64 / self.hold_ms as f64).clamp(0.0, 1.0)
    }

    /// Whether ticks carrying `handle` are still accepted.
    pub fn is_current(&self, handle: TickHandle) -> bool {
        self.state == HoldState::Holding && self.active == Some(handle)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Target `day` for a new hold. Anything in progress is dropped.
    pub fn arm(&mut self, day: u8) {
        self.close();
        self.day = Some(day);
    }

    /// Show `day` read-only.
    pub fn show(&mut self, day: u8) {
        self.close();
        self.day = Some(day);
        self.state = HoldState::Viewing;
    }

    /// Start holding. Returns the tick handle when this press began the
    /// hold; presses from further pointers join the existing hold and
    /// return `None`.
    pub fn press(&mut self, pointer: PointerId) -> Option<TickHandle> {
        match self.state {
            HoldState::Idle if self.day.is_some() => {
                self.generation += 1;
                let handle = TickHandle {
                    generation: self.generation,
                };
                self.clear_progress();
                self.active = Some(handle);
                self.pointers.insert(pointer);
                self.state = HoldState::Holding;
                Some(handle)
            }
            HoldState::Holding => {
                self.pointers.insert(pointer);
                None
            }
            _ => None,
        }
    }

    /// A pointer lifted or left. Cancels the hold if that pointer is part
    /// of it; returns the discarded elapsed time.
    pub fn release(&mut self, pointer: PointerId) -> Option<u64> {
        if self.state != HoldState::Holding || !self.pointers.contains(&pointer) {
            return None;
        }
        self.cancel()
    }

    /// Abandon the hold regardless of which pointers are down. No-op unless
    /// holding.
    pub fn cancel(&mut self) -> Option<u64> {
        if self.state != HoldState::Holding {
            return None;
        }
        let discarded = self.elapsed_ms;
        self.clear_progress();
        self.state = HoldState::Idle;
        Some(discarded)
    }

    /// Advance the hold by `delta`.
    pub fn tick(&mut self, handle: TickHandle, delta: Duration) -> TickOutcome {
        if !self.is_current(handle) {
            return TickOutcome::Ignored;
        }
        let Some(day) = self.day else {
            return TickOutcome::Ignored;
        };

        self.elapsed_ms = self.elapsed_ms.saturating_add(duration_ms(delta));
        if self.elapsed_ms >= self.hold_ms {
            self.active = None;
            self.pointers.clear();
            self.state = HoldState::Completed;
            return TickOutcome::Completed {
                day,
                elapsed_ms: self.elapsed_ms,
            };
        }

        let fraction = self.fraction();
        let level = HoldIntensity::from_fraction(fraction);
        let intensified = if level > self.intensity {
            self.intensity = level;
            Some(level)
        } else {
            None
        };
        let primed = !self.primed && level >= HoldIntensity::Surging;
        if primed {
            self.primed = true;
        }

        TickOutcome::Progress {
            elapsed_ms: self.elapsed_ms,
            fraction,
            intensified,
            primed,
        }
    }

    /// Leave the interaction. The next `arm` or `show` starts clean.
    pub fn close(&mut self) {
        self.clear_progress();
        self.day = None;
        self.state = HoldState::Idle;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn clear_progress(&mut self) {
        self.active = None;
        self.pointers.clear();
        self.elapsed_ms = 0;
        self.intensity = HoldIntensity::Calm;
        self.primed = false;
    }
}

pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
