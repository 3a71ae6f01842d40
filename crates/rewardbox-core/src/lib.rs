//! # Rewardbox Core Library
//!
//! This library provides the core logic for a seven-day reward calendar:
//! one reward unlocks per elapsed day, and the user reveals it by holding
//! a control for a few seconds. The `rewardbox` CLI is a thin front end
//! over the same library.
//!
//! ## Architecture
//!
//! - **Calendar**: Day calculator that turns "now" and a fixed start instant
//!   into the highest unlocked day, plus a watcher for day changes
//! - **Storage**: One JSON record in a SQLite key-value slot and TOML-based
//!   configuration
//! - **Unlock**: Hold-to-unlock state machine driven by caller-supplied ticks
//! - **Celebration**: Seeded particle-burst plans for the reveal
//!
//! ## Key Components
//!
//! - [`RewardCalendar`]: Owns progress and drives every interaction
//! - [`ClaimStore`]: Loads and saves the progress record
//! - [`HoldInteraction`]: Hold state machine
//! - [`Config`]: Application configuration management

pub mod availability;
pub mod calendar;
pub mod catalog;
pub mod celebration;
pub mod controller;
pub mod error;
pub mod events;
pub mod storage;
pub mod unlock;

pub use availability::{DayCard, DayStatus};
pub use calendar::{Clock, FixedClock, SystemClock, DAY_COUNT};
pub use catalog::{Rarity, Reward, RewardCatalog};
pub use celebration::{BurstPlan, CelebrationConfig};
pub use controller::{OpenOutcome, RewardCalendar};
pub use error::{ConfigError, CoreError, OpenRejection, StorageError, ValidationError};
pub use events::Event;
pub use storage::{ClaimStore, Config, Database, MemorySlot, ProgressState, SqliteSlot, StateSlot};
pub use unlock::{CancelReason, HoldIntensity, HoldInteraction, HoldState, PointerId, TickHandle};

#[cfg(feature = "admin")]
pub use controller::admin::Admin;
