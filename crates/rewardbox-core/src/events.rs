use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Reward;
use crate::unlock::{CancelReason, HoldIntensity, HoldState};

/// Every state change in the calendar produces an Event.
/// Front ends render from them; nothing in the core depends on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    HoldStarted {
        day: u8,
        hold_duration_ms: u64,
        at: DateTime<Utc>,
    },
    HoldProgress {
        day: u8,
        elapsed_ms: u64,
        fraction: f64,
        at: DateTime<Utc>,
    },
    /// Hold progress crossed into a stronger intensity level.
    HoldIntensified {
        day: u8,
        intensity: HoldIntensity,
        at: DateTime<Utc>,
    },
    /// Celebration planned ahead of completion.
    CelebrationPrimed {
        day: u8,
        particle_count: usize,
        at: DateTime<Utc>,
    },
    HoldCancelled {
        day: u8,
        discarded_ms: u64,
        reason: CancelReason,
        at: DateTime<Utc>,
    },
    /// The hold completed and the day is claimed. `persisted` is false when
    /// the claim only lives in memory for this session.
    RewardRevealed {
        reward: Reward,
        persisted: bool,
        at: DateTime<Utc>,
    },
    DayUnlocked {
        from_day: u8,
        to_day: u8,
        at: DateTime<Utc>,
    },
    ProgressReset {
        at: DateTime<Utc>,
    },
    AllClaimed {
        at: DateTime<Utc>,
    },
    StartInstantForced {
        unlocked_day: u8,
        start_instant: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        unlocked_day: u8,
        claimed_days: Vec<u8>,
        start_instant: DateTime<Utc>,
        next_unlock_at: Option<DateTime<Utc>>,
        reference_time: DateTime<FixedOffset>,
        hold_state: HoldState,
        at: DateTime<Utc>,
    },
}
