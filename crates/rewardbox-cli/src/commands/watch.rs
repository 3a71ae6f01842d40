use rewardbox_core::{RewardCalendar, DAY_COUNT};

use crate::common::{self, CliResult};

pub fn run() -> CliResult {
    let config = common::load_config()?;
    let mut calendar = common::open_calendar(&config)?;
    common::emit(&calendar.snapshot())?;
    common::runtime()?.block_on(poll(&mut calendar))
}

/// Poll until every day is unlocked or Ctrl-C.
async fn poll(calendar: &mut RewardCalendar) -> CliResult {
    let mut ticker = tokio::time::interval(calendar.day_poll_interval());
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    while calendar.unlocked_day() < DAY_COUNT {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(event) = calendar.poll_day() {
                    common::emit(&event)?;
                }
            }
            signal = &mut ctrl_c => {
                signal?;
                return Ok(());
            }
        }
    }
    tracing::info!("all days unlocked, nothing left to watch");
    Ok(())
}
