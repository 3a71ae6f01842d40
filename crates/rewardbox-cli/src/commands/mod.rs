pub mod board;
pub mod config;
#[cfg(feature = "admin")]
pub mod debug;
pub mod open;
pub mod status;
pub mod watch;
