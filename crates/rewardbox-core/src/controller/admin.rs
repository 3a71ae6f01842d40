//! Debug operations for testing the calendar.
//!
//! Only compiled with the `admin` feature. Each operation closes any open
//! interaction first, then writes the new record before replacing the
//! in-memory state, so a failed write leaves both unchanged.

use crate::calendar;
use crate::error::StorageError;
use crate::events::Event;

use super::RewardCalendar;

/// Borrowed admin view of a [`RewardCalendar`].
pub struct Admin<'a> {
    calendar: &'a mut RewardCalendar,
}

impl RewardCalendar {
    pub fn admin(&mut self) -> Admin<'_> {
        Admin { calendar: self }
    }
}

impl Admin<'_> {
    /// Clear the stored record and return to defaults.
    pub fn reset_all(&mut self) -> Result<Event, StorageError> {
        self.calendar.close();
        self.calendar.store.reset()?;
        self.calendar.state = self.calendar.store.defaults();
        tracing::info!("progress reset to defaults");
        Ok(Event::ProgressReset {
            at: self.calendar.now(),
        })
    }

    /// Mark every day claimed.
    pub fn claim_all(&mut self) -> Result<Event, StorageError> {
        self.calendar.close();
        let mut next = self.calendar.state.clone();
        next.claim_all();
        self.calendar.store.save(&next)?;
        self.calendar.state = next;
        tracing::info!("all days marked claimed");
        Ok(Event::AllClaimed {
            at: self.calendar.now(),
        })
    }

    /// Move the start instant so that `day` is the current unlocked day.
    /// Claims are untouched. Values above 7 are clamped.
    pub fn force_unlock_through_day(&mut self, day: u8) -> Result<Event, StorageError> {
        self.calendar.close();
        let now = self.calendar.now();
        let start = calendar::start_for_unlocked_day(now, day);
        let mut next = self.calendar.state.clone();
        next.set_start_instant(start);
        self.calendar.store.save(&next)?;
        self.calendar.state = next;

        let unlocked_day = self.calendar.state.unlocked_day(now);
        tracing::info!(unlocked_day, start = %start, "start instant forced");
        Ok(Event::StartInstantForced {
            unlocked_day,
            start_instant: start,
            at: now,
        })
    }
}
