use crate::common::{self, CliResult};

pub fn run() -> CliResult {
    let config = common::load_config()?;
    let calendar = common::open_calendar(&config)?;
    common::print_json(&calendar.snapshot())?;
    Ok(())
}
