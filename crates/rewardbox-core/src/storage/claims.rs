//! Persisted claim progress.
//!
//! The whole progress record lives in one named slot as a single JSON blob:
//!
//! ```json
//! {"claimedDays":[1,3],"startInstant":"2025-09-01T06:00:00Z"}
//! ```
//!
//! Loading is lenient. Fields missing from an older record fall back to the
//! defaults, out-of-range days are dropped, and a record that cannot be
//! parsed at all is treated as absent. Saving always writes the full record.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StateSlot;
use crate::calendar::{self, DAY_COUNT};
use crate::error::StorageError;

/// Name of the slot holding the progress record.
pub const STATE_SLOT_KEY: &str = "login_rewards_state";

/// Claimed days plus the instant anchoring day 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    claimed_days: BTreeSet<u8>,
    start_instant: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    #[serde(default, alias = "claimedRewards")]
    claimed_days: Option<Vec<i64>>,
    #[serde(default, alias = "startDate")]
    start_instant: Option<StoredInstant>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredInstant {
    Iso(DateTime<Utc>),
    EpochMillis(i64),
}

impl StoredInstant {
    fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            StoredInstant::Iso(at) => Some(*at),
            StoredInstant::EpochMillis(ms) => DateTime::from_timestamp_millis(*ms),
        }
    }
}

fn is_calendar_day(day: i64) -> bool {
    (1..=i64::from(DAY_COUNT)).contains(&day)
}

impl ProgressState {
    /// Fresh progress: nothing claimed.
    pub fn new(start_instant: DateTime<Utc>) -> Self {
        Self {
            claimed_days: BTreeSet::new(),
            start_instant,
        }
    }

    /// Progress with some days already claimed. Days outside 1..=7 are ignored.
    pub fn with_claimed(start_instant: DateTime<Utc>, days: impl IntoIterator<Item = u8>) -> Self {
        let mut state = Self::new(start_instant);
        for day in days {
            state.claim(day);
        }
        state
    }

    pub fn claimed_days(&self) -> &BTreeSet<u8> {
        &self.claimed_days
    }

    pub fn is_claimed(&self, day: u8) -> bool {
        self.claimed_days.contains(&day)
    }

    pub fn start_instant(&self) -> DateTime<Utc> {
        self.start_instant
    }

    pub fn unlocked_day(&self, now: DateTime<Utc>) -> u8 {
        calendar::unlocked_day(now, self.start_instant)
    }

    /// Add `day` to the claimed set. Returns false if it was already
    /// claimed or is not a calendar day.
    pub(crate) fn claim(&mut self, day: u8) -> bool {
        if !is_calendar_day(i64::from(day)) {
            return false;
        }
        self.claimed_days.insert(day)
    }

    #[cfg(feature = "admin")]
    pub(crate) fn claim_all(&mut self) {
        self.claimed_days.extend(1..=DAY_COUNT);
    }

    #[cfg(feature = "admin")]
    pub(crate) fn set_start_instant(&mut self, start_instant: DateTime<Utc>) {
        self.start_instant = start_instant;
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a stored record, filling gaps from `default_start`.
    pub fn from_json(json: &str, default_start: DateTime<Utc>) -> Result<Self, serde_json::Error> {
        let record: StoredRecord = serde_json::from_str(json)?;
        let start_instant = record
            .start_instant
            .and_then(|at| at.to_utc())
            .unwrap_or(default_start);
        let claimed_days = record
            .claimed_days
            .unwrap_or_default()
            .into_iter()
            .filter(|day| is_calendar_day(*day))
            .map(|day| day as u8)
            .collect();
        Ok(Self {
            claimed_days,
            start_instant,
        })
    }
}

/// Loads and saves [`ProgressState`] through a [`StateSlot`].
pub struct ClaimStore {
    slot: Box<dyn StateSlot>,
    key: String,
    default_start: DateTime<Utc>,
}

impl ClaimStore {
    pub fn new(slot: Box<dyn StateSlot>, default_start: DateTime<Utc>) -> Self {
        Self {
            slot,
            key: STATE_SLOT_KEY.to_string(),
            default_start,
        }
    }

    /// Initial progress for a first run or after a reset.
    pub fn defaults(&self) -> ProgressState {
        ProgressState::new(self.default_start)
    }

    /// Load progress, falling back to defaults on any failure.
    pub fn load(&self) -> ProgressState {
        match self.try_load() {
            Ok(Some(state)) => state,
            Ok(None) => {
                tracing::debug!(slot = %self.key, "no saved progress, starting fresh");
                self.defaults()
            }
            Err(e) => {
                tracing::warn!(slot = %self.key, error = %e, "discarding unreadable progress");
                self.defaults()
            }
        }
    }

    /// Load progress, reporting why a stored record could not be used.
    ///
    /// # Errors
    /// Returns [`StorageError::ReadFailed`] if the backend fails and
    /// [`StorageError::Malformed`] if the record does not decode.
    pub fn try_load(&self) -> Result<Option<ProgressState>, StorageError> {
        let Some(json) = self.slot.read(&self.key)? else {
            return Ok(None);
        };
        ProgressState::from_json(&json, self.default_start)
            .map(Some)
            .map_err(|source| StorageError::Malformed {
                slot: self.key.clone(),
                source,
            })
    }

    /// Persist the full record, replacing whatever was stored.
    ///
    /// # Errors
    /// Returns [`StorageError::WriteFailed`] if the backend rejects the write.
    pub fn save(&self, state: &ProgressState) -> Result<(), StorageError> {
        let json = state.to_json().map_err(|e| StorageError::WriteFailed {
            slot: self.key.clone(),
            message: e.to_string(),
        })?;
        self.slot.write(&self.key, &json)
    }

    /// Remove the stored record so the next load yields defaults.
    pub fn reset(&self) -> Result<(), StorageError> {
        self.slot.clear(&self.key)
    }
}
