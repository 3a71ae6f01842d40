use rewardbox_core::{
    BurstPlan, CancelReason, Config, Event, OpenOutcome, PointerId, RewardCalendar, TickHandle,
};
use tokio::time::{Instant, MissedTickBehavior};

use crate::common::{self, CliResult};

/// The terminal is a single pointer.
const POINTER: PointerId = 0;
const BAR_WIDTH: usize = 30;

pub fn run(day: u32, hold_ms: Option<u64>) -> CliResult {
    let mut config = common::load_config()?;
    if let Some(ms) = hold_ms {
        config.apply("hold.duration_ms", &ms.to_string())?;
    }
    let mut calendar = common::open_calendar(&config)?;

    match calendar.open(day)? {
        OpenOutcome::AlreadyClaimed(reward) => {
            println!("Already claimed:");
            common::print_reward(&reward);
            calendar.close();
            Ok(())
        }
        OpenOutcome::Unbox { .. } => {
            let result = common::runtime()?.block_on(hold(&mut calendar, &config));
            calendar.close();
            result
        }
    }
}

async fn hold(calendar: &mut RewardCalendar, config: &Config) -> CliResult {
    let Some((handle, started)) = calendar.press(POINTER) else {
        return Err("day is no longer available".into());
    };
    common::emit(&started)?;
    eprintln!("Holding... press Ctrl-C to let go");

    let Some(revealed) = run_ticks(calendar, config, handle).await? else {
        return Ok(());
    };

    tokio::time::sleep(config.reveal_delay()).await;
    common::emit(&revealed)?;
    if let Event::RewardRevealed { reward, persisted, .. } = &revealed {
        common::print_reward(reward);
        if !*persisted {
            eprintln!("warning: progress could not be saved and will be lost when this session ends");
        }
    }
    if let Some(plan) = calendar.take_celebration() {
        eprintln!("{}", describe_celebration(&plan));
    }
    Ok(())
}

/// Feed ticks until the hold completes or Ctrl-C releases it. Returns the
/// reveal event on completion.
async fn run_ticks(
    calendar: &mut RewardCalendar,
    config: &Config,
    handle: TickHandle,
) -> Result<Option<Event>, Box<dyn std::error::Error>> {
    let mut ticker = tokio::time::interval(config.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately.
    ticker.tick().await;
    let mut last = Instant::now();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                let delta = now - last;
                last = now;

                let mut revealed = None;
                for event in calendar.tick(handle, delta) {
                    match event {
                        Event::HoldProgress { fraction, .. } => render_bar(fraction),
                        Event::RewardRevealed { .. } => revealed = Some(event),
                        other => {
                            clear_bar();
                            common::emit(&other)?;
                        }
                    }
                }
                if !calendar.hold().is_current(handle) {
                    clear_bar();
                    return Ok(revealed);
                }
            }
            signal = &mut ctrl_c => {
                signal?;
                clear_bar();
                if let Some(event) = calendar.release(POINTER, CancelReason::Release) {
                    common::emit(&event)?;
                }
                eprintln!("Let go too early; nothing was claimed");
                return Ok(None);
            }
        }
    }
}

fn render_bar(fraction: f64) {
    let filled = ((fraction * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    eprint!(
        "\r[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        (fraction * 100.0).round() as u32
    );
}

fn clear_bar() {
    eprint!("\r{}\r", " ".repeat(BAR_WIDTH + 8));
}

fn describe_celebration(plan: &BurstPlan) -> String {
    format!(
        "* {} particles in {} burst(s) over {} ms *",
        plan.particle_count(),
        plan.bursts.len(),
        plan.total_ms()
    )
}
