mod day;
mod watcher;

pub use day::{
    next_unlock_at, reference_offset, reference_time, start_for_unlocked_day, unlocked_day,
    Clock, FixedClock, SystemClock, DAY_COUNT,
};
pub use watcher::{DayChange, DayWatcher};
