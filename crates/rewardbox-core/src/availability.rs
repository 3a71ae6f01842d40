//! Availability policy: whether a day is locked, available, or claimed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Reward, RewardCatalog};
use crate::storage::ProgressState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Locked,
    Available,
    Claimed,
}

/// Status of `day` at `now`. Claimed wins over everything else.
pub fn status(day: u8, state: &ProgressState, now: DateTime<Utc>) -> DayStatus {
    if state.is_claimed(day) {
        DayStatus::Claimed
    } else if day >= 1 && day <= state.unlocked_day(now) {
        DayStatus::Available
    } else {
        DayStatus::Locked
    }
}

/// What a renderer needs for one day. The reward is only revealed once
/// the day is claimed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCard {
    pub day: u8,
    pub status: DayStatus,
    pub reward: Option<Reward>,
}

/// One card per catalog entry, in day order.
pub fn board(catalog: &RewardCatalog, state: &ProgressState, now: DateTime<Utc>) -> Vec<DayCard> {
    catalog
        .iter()
        .map(|reward| {
            let status = status(reward.day, state, now);
            DayCard {
                day: reward.day,
                status,
                reward: (status == DayStatus::Claimed).then(|| reward.clone()),
            }
        })
        .collect()
}
