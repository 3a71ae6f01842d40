//! Particle-burst celebration planning.
//!
//! A celebration is one or more bursts of particles fired around the reveal
//! point. Every variant (a single burst, the default triangle of three
//! staggered bursts, denser or sparser sprays) is the same routine with a
//! different [`CelebrationConfig`]. The planner only produces data; drawing
//! is up to the front end, which samples [`BurstPlan::frames_at`] on its own
//! animation clock.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Colours particles are drawn from.
pub const PALETTE: [&str; 8] = [
    "#ffd700", "#ff6b6b", "#4facfe", "#00f2fe", "#667eea", "#764ba2", "#a8edea", "#fed6e3",
];

const SPIN_DEGREES: f64 = 720.0;
const SHRINK: f64 = 0.7;
const FADE_RATE: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleShape {
    Circle,
    Square,
    Triangle,
    Star,
}

impl ParticleShape {
    const ALL: [ParticleShape; 4] = [
        ParticleShape::Circle,
        ParticleShape::Square,
        ParticleShape::Triangle,
        ParticleShape::Star,
    ];
}

/// Burst centre relative to the reveal point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurstOffset {
    pub x: f64,
    pub y: f64,
}

/// Tuning for the celebration effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelebrationConfig {
    #[serde(default = "default_particles_per_burst")]
    pub particles_per_burst: usize,
    /// Delay between consecutive bursts.
    #[serde(default = "default_burst_stagger_ms")]
    pub burst_stagger_ms: u64,
    /// Lifetime of a single burst's particles.
    #[serde(default = "default_animation_ms")]
    pub animation_ms: u64,
    #[serde(default = "default_min_size")]
    pub min_size: f64,
    #[serde(default = "default_max_size")]
    pub max_size: f64,
    #[serde(default = "default_min_velocity")]
    pub min_velocity: f64,
    #[serde(default = "default_max_velocity")]
    pub max_velocity: f64,
    /// Downward pull added over the animation, in the same units as velocity.
    #[serde(default = "default_gravity")]
    pub gravity: f64,
    /// Probability that a particle gets the sparkle treatment.
    #[serde(default = "default_sparkle_chance")]
    pub sparkle_chance: f64,
    /// Fixed RNG seed for reproducible plans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default = "default_bursts")]
    pub bursts: Vec<BurstOffset>,
}

fn default_particles_per_burst() -> usize {
    35
}
fn default_burst_stagger_ms() -> u64 {
    500
}
fn default_animation_ms() -> u64 {
    2_000
}
fn default_min_size() -> f64 {
    8.0
}
fn default_max_size() -> f64 {
    24.0
}
fn default_min_velocity() -> f64 {
    150.0
}
fn default_max_velocity() -> f64 {
    450.0
}
fn default_gravity() -> f64 {
    300.0
}
fn default_sparkle_chance() -> f64 {
    0.3
}
fn default_bursts() -> Vec<BurstOffset> {
    // Triangle around the reveal point: top, bottom left, bottom right.
    vec![
        BurstOffset { x: 0.0, y: -60.0 },
        BurstOffset { x: -50.0, y: 40.0 },
        BurstOffset { x: 50.0, y: 40.0 },
    ]
}

impl Default for CelebrationConfig {
    fn default() -> Self {
        Self {
            particles_per_burst: default_particles_per_burst(),
            burst_stagger_ms: default_burst_stagger_ms(),
            animation_ms: default_animation_ms(),
            min_size: default_min_size(),
            max_size: default_max_size(),
            min_velocity: default_min_velocity(),
            max_velocity: default_max_velocity(),
            gravity: default_gravity(),
            sparkle_chance: default_sparkle_chance(),
            seed: None,
            bursts: default_bursts(),
        }
    }
}

impl CelebrationConfig {
    /// A single centred burst.
    pub fn single_burst() -> Self {
        Self {
            bursts: vec![BurstOffset { x: 0.0, y: 0.0 }],
            ..Self::default()
        }
    }

    pub fn total_particles(&self) -> usize {
        self.bursts.len() * self.particles_per_burst
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: format!("celebration.{key}"),
            message: message.to_string(),
        };
        if self.animation_ms == 0 {
            return Err(invalid("animation_ms", "must be greater than zero"));
        }
        let numbers = [
            ("min_size", self.min_size),
            ("max_size", self.max_size),
            ("min_velocity", self.min_velocity),
            ("max_velocity", self.max_velocity),
            ("gravity", self.gravity),
            ("sparkle_chance", self.sparkle_chance),
        ];
        if let Some((key, _)) = numbers.iter().find(|(_, value)| !value.is_finite()) {
            return Err(invalid(*key, "must be a finite number"));
        }
        if self.bursts.iter().any(|b| !b.x.is_finite() || !b.y.is_finite()) {
            return Err(invalid("bursts", "offsets must be finite numbers"));
        }
        if self.min_size > self.max_size {
            return Err(invalid("min_size", "must not exceed max_size"));
        }
        if self.min_velocity > self.max_velocity {
            return Err(invalid("min_velocity", "must not exceed max_velocity"));
        }
        if !(0.0..=1.0).contains(&self.sparkle_chance) {
            return Err(invalid("sparkle_chance", "must be between 0 and 1"));
        }
        Ok(())
    }
}

/// One planned particle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub size: f64,
    pub color: String,
    pub shape: ParticleShape,
    /// Final displacement before gravity.
    pub dx: f64,
    pub dy: f64,
    /// Initial rotation in degrees.
    pub rotation: f64,
    pub sparkle: bool,
}

/// Particle state at one instant of its animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleFrame {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale: f64,
    pub opacity: f64,
}

impl Particle {
    /// Position and appearance after `progress` (clamped to 0..=1) of the
    /// animation, relative to the burst centre.
    pub fn frame(&self, progress: f64, gravity: f64) -> ParticleFrame {
        let p = progress.clamp(0.0, 1.0);
        ParticleFrame {
            x: self.dx * p,
            y: self.dy * p + p * p * gravity,
            rotation: self.rotation + p * SPIN_DEGREES,
            scale: 1.0 - p * SHRINK,
            opacity: (1.0 - p * FADE_RATE).max(0.0),
        }
    }
}

/// A burst fired `fire_at_ms` after the celebration starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Burst {
    pub fire_at_ms: u64,
    pub offset: BurstOffset,
    pub particles: Vec<Particle>,
}

/// Everything a front end needs to draw the celebration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstPlan {
    pub bursts: Vec<Burst>,
    pub animation_ms: u64,
    pub gravity: f64,
}

impl BurstPlan {
    /// Time at which the last burst finishes.
    pub fn total_ms(&self) -> u64 {
        self.bursts
            .iter()
            .map(|b| b.fire_at_ms + self.animation_ms)
            .max()
            .unwrap_or(0)
    }

    pub fn particle_count(&self) -> usize {
        self.bursts.iter().map(|b| b.particles.len()).sum()
    }

    /// Frames of every live particle `elapsed_ms` after the start, in
    /// reveal-point coordinates. Bursts that have not fired or have
    /// finished contribute nothing.
    pub fn frames_at(&self, elapsed_ms: u64) -> Vec<ParticleFrame> {
        let mut frames = Vec::new();
        for burst in &self.bursts {
            let Some(since) = elapsed_ms.checked_sub(burst.fire_at_ms) else {
                continue;
            };
            if since > self.animation_ms {
                continue;
            }
            let progress = since as f64 / self.animation_ms.max(1) as f64;
            frames.extend(burst.particles.iter().map(|particle| {
                let mut frame = particle.frame(progress, self.gravity);
                frame.x += burst.offset.x;
                frame.y += burst.offset.y;
                frame
            }));
        }
        frames
    }
}

/// Plan a celebration from `config`.
pub fn plan<R: Rng + ?Sized>(config: &CelebrationConfig, rng: &mut R) -> BurstPlan {
    let bursts = config
        .bursts
        .iter()
        .enumerate()
        .map(|(index, offset)| Burst {
            fire_at_ms: index as u64 * config.burst_stagger_ms,
            offset: *offset,
            particles: (0..config.particles_per_burst)
                .map(|_| plan_particle(config, rng))
                .collect(),
        })
        .collect();

    BurstPlan {
        bursts,
        animation_ms: config.animation_ms,
        gravity: config.gravity,
    }
}

fn plan_particle<R: Rng + ?Sized>(config: &CelebrationConfig, rng: &mut R) -> Particle {
    let angle = rng.gen_range(0.0..std::f64::consts::TAU);
    let velocity = span(rng, config.min_velocity, config.max_velocity);
    Particle {
        size: span(rng, config.min_size, config.max_size),
        color: PALETTE[rng.gen_range(0..PALETTE.len())].to_string(),
        shape: ParticleShape::ALL[rng.gen_range(0..ParticleShape::ALL.len())],
        dx: angle.cos() * velocity,
        dy: angle.sin() * velocity,
        rotation: rng.gen_range(0.0..360.0),
        sparkle: rng.gen_bool(config.sparkle_chance.clamp(0.0, 1.0)),
    }
}

fn span<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    fn seeded() -> Mcg128Xsl64 {
        Mcg128Xsl64::seed_from_u64(7)
    }

    #[test]
    fn default_plan_is_three_staggered_bursts() {
        let plan = plan(&CelebrationConfig::default(), &mut seeded());
        assert_eq!(plan.bursts.len(), 3);
        assert_eq!(plan.particle_count(), 105);
        let fire_times: Vec<u64> = plan.bursts.iter().map(|b| b.fire_at_ms).collect();
        assert_eq!(fire_times, vec![0, 500, 1000]);
        assert_eq!(plan.total_ms(), 3000);
    }

    #[test]
    fn single_burst_variant() {
        let config = CelebrationConfig::single_burst();
        let plan = plan(&config, &mut seeded());
        assert_eq!(plan.bursts.len(), 1);
        assert_eq!(plan.particle_count(), config.total_particles());
    }

    #[test]
    fn particles_respect_configured_ranges() {
        let config = CelebrationConfig::default();
        let plan = plan(&config, &mut seeded());
        for particle in plan.bursts.iter().flat_map(|b| &b.particles) {
            assert!(particle.size >= config.min_size && particle.size < config.max_size);
            let speed = particle.dx.hypot(particle.dy);
            assert!(speed >= config.min_velocity - 1e-6);
            assert!(speed <= config.max_velocity + 1e-6);
            assert!(PALETTE.contains(&particle.color.as_str()));
        }
    }

    #[test]
    fn same_seed_same_plan() {
        let config = CelebrationConfig::default();
        assert_eq!(plan(&config, &mut seeded()), plan(&config, &mut seeded()));
    }

    #[test]
    fn degenerate_ranges_do_not_panic() {
        let config = CelebrationConfig {
            min_size: 10.0,
            max_size: 10.0,
            min_velocity: 0.0,
            max_velocity: 0.0,
            ..CelebrationConfig::single_burst()
        };
        let plan = plan(&config, &mut seeded());
        assert!(plan.bursts[0].particles.iter().all(|p| p.size == 10.0));
    }

    #[test]
    fn frame_follows_trajectory() {
        let particle = Particle {
            size: 10.0,
            color: PALETTE[0].to_string(),
            shape: ParticleShape::Star,
            dx: 100.0,
            dy: -200.0,
            rotation: 30.0,
            sparkle: false,
        };
        let start = particle.frame(0.0, 300.0);
        assert_eq!((start.x, start.y, start.scale, start.opacity), (0.0, 0.0, 1.0, 1.0));

        let half = particle.frame(0.5, 300.0);
        assert_eq!(half.x, 50.0);
        assert_eq!(half.y, -100.0 + 75.0);
        assert_eq!(half.rotation, 30.0 + 360.0);

        let end = particle.frame(2.0, 300.0);
        assert_eq!(end.opacity, 0.0);
        assert!((end.scale - 0.3).abs() < 1e-9);
    }

    #[test]
    fn frames_at_only_includes_live_bursts() {
        let plan = plan(&CelebrationConfig::default(), &mut seeded());
        assert_eq!(plan.frames_at(0).len(), 35);
        assert_eq!(plan.frames_at(1200).len(), 105);
        assert_eq!(plan.frames_at(2300).len(), 70);
        assert!(plan.frames_at(3001).is_empty());
    }

    #[test]
    fn validate_rejects_inverted_ranges() {
        let config = CelebrationConfig {
            min_size: 30.0,
            ..CelebrationConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(CelebrationConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_finite_values() {
        let config = CelebrationConfig {
            max_velocity: f64::INFINITY,
            ..CelebrationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "celebration.max_velocity"
        ));

        let config = CelebrationConfig {
            gravity: f64::NAN,
            ..CelebrationConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CelebrationConfig {
            bursts: vec![BurstOffset { x: f64::NEG_INFINITY, y: 0.0 }],
            ..CelebrationConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
