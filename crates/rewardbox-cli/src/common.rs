//! Helpers shared by the subcommands.

use rewardbox_core::{Config, CoreError, Event, Reward, RewardCalendar};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Load the config file, creating it with defaults on first run.
pub fn load_config() -> Result<Config, CoreError> {
    Ok(Config::load()?)
}

/// Calendar over the on-disk slot and the wall clock.
pub fn open_calendar(config: &Config) -> Result<RewardCalendar, CoreError> {
    RewardCalendar::open_default(config)
}

/// Current-thread runtime for the commands that wait on timers or signals.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One event per line.
pub fn emit(event: &Event) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

pub fn print_reward(reward: &Reward) {
    println!("{}  {}  [{}]", reward.icon, reward.title, reward.rarity);
    println!("    {}", reward.description);
}
