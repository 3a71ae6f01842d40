use rewardbox_core::{DayCard, DayStatus};

use crate::common::{self, CliResult};

pub fn run(json: bool) -> CliResult {
    let config = common::load_config()?;
    let calendar = common::open_calendar(&config)?;
    let cards = calendar.board();

    if json {
        common::print_json(&cards)?;
        return Ok(());
    }

    println!("Unlocked through day {}", calendar.unlocked_day());
    for card in &cards {
        println!("{}", render_card(card));
    }
    Ok(())
}

fn render_card(card: &DayCard) -> String {
    match (&card.status, &card.reward) {
        (DayStatus::Claimed, Some(reward)) => format!(
            "Day {}  claimed    {} {} ({})",
            card.day,
            reward.icon,
            reward.short_title(),
            reward.rarity
        ),
        (DayStatus::Available, _) => format!("Day {}  available  hold to open", card.day),
        _ => format!("Day {}  locked", card.day),
    }
}
