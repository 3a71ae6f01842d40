mod claims;
mod config;
pub mod database;
mod slot;

pub use claims::{ClaimStore, ProgressState, STATE_SLOT_KEY};
pub use config::{CalendarConfig, Config, HoldConfig};
pub use database::Database;
pub use slot::{MemorySlot, SqliteSlot, StateSlot};

use std::path::PathBuf;

/// Returns the data directory.
///
/// `REWARDBOX_HOME` overrides the location outright. Otherwise this is
/// `~/.config/rewardbox[-dev]/` based on `REWARDBOX_ENV`; set
/// `REWARDBOX_ENV=dev` to use a development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("REWARDBOX_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("REWARDBOX_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("rewardbox-dev")
            } else {
                base_dir.join("rewardbox")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
