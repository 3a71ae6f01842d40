//! Reward catalog.
//!
//! A catalog is an ordered list of exactly seven rewards, one per day.
//! Rewards are presentation payload only; the `day` field is the join key
//! used by the availability policy and the unlock interaction.
//!
//! Catalogs can be supplied as TOML:
//!
//! ```toml
//! [[rewards]]
//! day = 1
//! title = "Fancy Snack and Catch Up Date"
//! description = "..."
//! icon = "🍰"
//! rarity = "rare"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calendar::DAY_COUNT;
use crate::error::{ConfigError, CoreError, ValidationError};

const SHORT_TITLE_MAX: usize = 20;
const SHORT_TITLE_KEEP: usize = 17;

/// Presentation-only classification of a reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single day's reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub day: u8,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub rarity: Rarity,
}

impl Reward {
    /// Title for compact cards: long titles keep 17 characters plus `...`.
    pub fn short_title(&self) -> String {
        if self.title.chars().count() > SHORT_TITLE_MAX {
            let head: String = self.title.chars().take(SHORT_TITLE_KEEP).collect();
            format!("{head}...")
        } else {
            self.title.clone()
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    rewards: Vec<Reward>,
}

/// Validated, day-ordered list of seven rewards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardCatalog {
    rewards: Vec<Reward>,
}

impl RewardCatalog {
    /// Build a catalog, sorting by day.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] unless days 1..=7 each appear exactly once.
    pub fn new(mut rewards: Vec<Reward>) -> Result<Self, ValidationError> {
        if rewards.len() != usize::from(DAY_COUNT) {
            return Err(ValidationError::CatalogSize {
                expected: usize::from(DAY_COUNT),
                actual: rewards.len(),
            });
        }
        rewards.sort_by_key(|r| r.day);

        if let Some(bad) = rewards.iter().find(|r| r.day == 0 || r.day > DAY_COUNT) {
            return Err(ValidationError::DayOutOfRange {
                day: u32::from(bad.day),
                max: DAY_COUNT,
            });
        }
        if let Some(pair) = rewards.windows(2).find(|w| w[0].day == w[1].day) {
            return Err(ValidationError::DuplicateDay(pair[0].day));
        }
        Ok(Self { rewards })
    }

    /// Parse a TOML catalog (`[[rewards]]` tables).
    pub fn from_toml_str(content: &str) -> Result<Self, CoreError> {
        let file: CatalogFile =
            toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Ok(Self::new(file.rewards)?)
    }

    /// Load a TOML catalog from disk.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn get(&self, day: u8) -> Option<&Reward> {
        day.checked_sub(1)
            .and_then(|index| self.rewards.get(usize::from(index)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reward> {
        self.rewards.iter()
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}

impl Default for RewardCatalog {
    fn default() -> Self {
        Self {
            rewards: stock_rewards(),
        }
    }
}

fn reward(day: u8, title: &str, description: &str, icon: &str, rarity: Rarity) -> Reward {
    Reward {
        day,
        title: title.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        rarity,
    }
}

fn stock_rewards() -> Vec<Reward> {
    vec![
        reward(
            1,
            "Fancy Snack and Catch Up Date",
            "One specialty snack and one specialty drink from a favorite shop, \
             enjoyed over a long catch up about the last few months and what \
             to focus on next.",
            "🍰",
            Rarity::Rare,
        ),
        reward(
            2,
            "Game Night Together",
            "An evening of games: an escape room box, board games, card games, \
             or something brand new.",
            "🎮",
            Rarity::Rare,
        ),
        reward(
            3,
            "Lunch Date",
            "Pick up any food or treat on the way home and eat together on the \
             patio, or head out to lunch somewhere.",
            "🥙",
            Rarity::Rare,
        ),
        reward(
            4,
            "Art Project Together",
            "Make an art project together as a way to reflect on this last \
             phase of life and set intentions for the next one.",
            "🎨",
            Rarity::Epic,
        ),
        reward(
            5,
            "Memory Jar Filling",
            "Go through the notes from the trip and fill the memory jar with \
             favorite moments.",
            "💭",
            Rarity::Epic,
        ),
        reward(
            6,
            "Big Sushi Order!",
            "A huge sushi order to celebrate an amazing achievement.",
            "🍣",
            Rarity::Epic,
        ),
        reward(
            7,
            "Full Body Massage",
            "A full body massage of at least one hour, today or redeemable at \
             any time of your choosing.",
            "💆",
            Rarity::Legendary,
        ),
    ]
}
