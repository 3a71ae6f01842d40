use serde::{Deserialize, Serialize};

/// How far along a hold is, in coarse steps a renderer can escalate on.
///
/// Levels: Calm below 25%, Building from 25%, Surging from 50%, Peak from 75%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldIntensity {
    Calm,
    Building,
    Surging,
    Peak,
}

const THRESHOLDS: [(f64, HoldIntensity); 3] = [
    (0.75, HoldIntensity::Peak),
    (0.50, HoldIntensity::Surging),
    (0.25, HoldIntensity::Building),
];

impl HoldIntensity {
    pub fn from_fraction(fraction: f64) -> Self {
        THRESHOLDS
            .iter()
            .find(|(threshold, _)| fraction >= *threshold)
            .map(|(_, level)| *level)
            .unwrap_or(HoldIntensity::Calm)
    }

    pub fn as_u8(self) -> u8 {
        match self {
            HoldIntensity::Calm => 0,
            HoldIntensity::Building => 1,
            HoldIntensity::Surging => 2,
            HoldIntensity::Peak => 3,
        }
    }
}

impl Default for HoldIntensity {
    fn default() -> Self {
        HoldIntensity::Calm
    }
}
