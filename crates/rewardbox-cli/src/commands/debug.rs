use clap::Subcommand;

use crate::common::{self, CliResult};

#[derive(Subcommand)]
pub enum DebugAction {
    /// Clear all progress
    Reset,
    /// Mark every day claimed
    ClaimAll,
    /// Move the start so that the given day is the current one (0-7)
    SetDay {
        day: u8,
    },
}

pub fn run(action: DebugAction) -> CliResult {
    let config = common::load_config()?;
    let mut calendar = common::open_calendar(&config)?;
    let mut admin = calendar.admin();

    let event = match action {
        DebugAction::Reset => admin.reset_all()?,
        DebugAction::ClaimAll => admin.claim_all()?,
        DebugAction::SetDay { day } => admin.force_unlock_through_day(day)?,
    };
    common::emit(&event)?;
    Ok(())
}
