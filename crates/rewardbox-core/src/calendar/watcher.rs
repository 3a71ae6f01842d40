use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Observed change of the unlocked day between two polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayChange {
    pub from: u8,
    pub to: u8,
}

/// Remembers the last unlocked day seen by a periodic poll.
///
/// The caller owns the timer; the watcher only decides whether a poll
/// observed something new.
#[derive(Debug, Clone)]
pub struct DayWatcher {
    last_seen: Option<u8>,
    poll_interval: Duration,
}

impl DayWatcher {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            last_seen: None,
            poll_interval,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn last_seen(&self) -> Option<u8> {
        self.last_seen
    }

    /// Record `day`. The first observation only seeds the watcher.
    pub fn observe(&mut self, day: u8) -> Option<DayChange> {
        let previous = self.last_seen.replace(day)?;
        (previous != day).then_some(DayChange {
            from: previous,
            to: day,
        })
    }
}
