//! Core error types for rewardbox-core.
//!
//! Nothing in the calendar core is fatal: storage failures degrade to
//! in-memory state and invalid requests are refused at the entry guard.
//! These types exist so callers can log or report what was degraded.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for rewardbox-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a state slot backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Reading the slot failed
    #[error("Failed to read slot '{slot}': {message}")]
    ReadFailed { slot: String, message: String },

    /// Writing the slot failed (disabled, full, locked)
    #[error("Failed to write slot '{slot}': {message}")]
    WriteFailed { slot: String, message: String },

    /// The slot holds a record that is not a valid progress record
    #[error("Malformed record in slot '{slot}': {source}")]
    Malformed {
        slot: String,
        #[source]
        source: serde_json::Error,
    },

    /// The data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Dot-path key does not name a configuration value
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors for catalogs and day numbers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Day number outside 1..=7
    #[error("Day {day} is outside 1..={max}")]
    DayOutOfRange { day: u32, max: u8 },

    /// Two catalog entries share a day
    #[error("Day {0} appears more than once in the catalog")]
    DuplicateDay(u8),

    /// Catalog has the wrong number of entries
    #[error("Catalog must hold {expected} rewards, found {actual}")]
    CatalogSize { expected: usize, actual: usize },
}

/// Reasons the interaction refuses to open for a day.
///
/// These are entry-guard outcomes, not failures: no state changes when
/// one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpenRejection {
    /// Requested day is outside 1..=7
    #[error("Day {0} does not exist")]
    InvalidDay(u32),

    /// Requested day has not been reached yet
    #[error("Day {day} is locked (unlocked through day {unlocked_day})")]
    Locked { day: u8, unlocked_day: u8 },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::ReadFailed {
            slot: String::from("kv"),
            message: err.to_string(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
