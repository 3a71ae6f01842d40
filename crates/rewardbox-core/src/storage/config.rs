//! TOML-based application configuration.
//!
//! Stores:
//! - The default start instant and the reference zone offset
//! - Hold-to-unlock timing
//! - Celebration burst layout and particle tuning
//! - An optional path to a custom reward catalog
//!
//! Configuration is stored at `<data dir>/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::catalog::RewardCatalog;
use crate::celebration::CelebrationConfig;
use crate::error::{ConfigError, CoreError};

/// Day-gating configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Instant anchoring day 1 on a first run.
    #[serde(default = "default_start")]
    pub default_start: DateTime<FixedOffset>,
    /// Reference zone offset from UTC, in minutes. Display only.
    #[serde(default = "default_reference_offset")]
    pub reference_offset_minutes: i32,
    /// How often a long-running front end re-checks the unlocked day.
    #[serde(default = "default_day_poll_secs")]
    pub day_poll_secs: u64,
}

/// Hold-to-unlock timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldConfig {
    #[serde(default = "default_hold_ms")]
    pub duration_ms: u64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Pause between the burst and showing the reward text.
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Custom reward catalog (TOML). The stock catalog is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub hold: HoldConfig,
    #[serde(default)]
    pub celebration: CelebrationConfig,
}

fn default_start() -> DateTime<FixedOffset> {
    reference_midnight(2025, 9, 1, default_reference_offset())
}
fn default_reference_offset() -> i32 {
    -6 * 60
}
fn default_day_poll_secs() -> u64 {
    60
}
fn default_hold_ms() -> u64 {
    5_000
}
fn default_tick_ms() -> u64 {
    50
}
fn default_reveal_delay_ms() -> u64 {
    800
}

fn reference_midnight(year: i32, month: u32, day: u32, offset_minutes: i32) -> DateTime<FixedOffset> {
    let offset = crate::calendar::reference_offset(offset_minutes);
    offset
        .with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_else(|| Utc::now().with_timezone(&offset))
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            default_start: default_start(),
            reference_offset_minutes: default_reference_offset(),
            day_poll_secs: default_day_poll_secs(),
        }
    }
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_hold_ms(),
            tick_ms: default_tick_ms(),
            reveal_delay_ms: default_reveal_delay_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: None,
            calendar: CalendarConfig::default(),
            hold: HoldConfig::default(),
            celebration: CelebrationConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let new_value = match obj.get(part) {
                Some(serde_json::Value::Bool(_)) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                Some(serde_json::Value::Number(_)) => parse_number(value).ok_or_else(|| {
                    invalid(format!("cannot parse '{value}' as number"))
                })?,
                Some(serde_json::Value::Object(_)) | Some(serde_json::Value::Array(_)) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                Some(_) => serde_json::Value::String(value.into()),
                // Unset optional values: take numbers as numbers, anything else as text.
                None if OPTIONAL_KEYS.contains(&key) => parse_number(value)
                    .unwrap_or_else(|| serde_json::Value::String(value.into())),
                None => return Err(unknown()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Path of the config file in the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("config.toml"),
                message: e.to_string(),
            })
    }

    /// Load from disk, writing the defaults if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing the defaults if it is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Update a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Update a value by dot-separated key and save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Reject settings the hold engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("hold.duration_ms", self.hold.duration_ms),
            ("hold.tick_ms", self.hold.tick_ms),
            ("calendar.day_poll_secs", self.calendar.day_poll_secs),
        ];
        if let Some((key, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        self.celebration.validate()
    }

    pub fn default_start_utc(&self) -> DateTime<Utc> {
        self.calendar.default_start.with_timezone(&Utc)
    }

    pub fn hold_duration(&self) -> Duration {
        Duration::from_millis(self.hold.duration_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.hold.tick_ms)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.hold.reveal_delay_ms)
    }

    pub fn day_poll_interval(&self) -> Duration {
        Duration::from_secs(self.calendar.day_poll_secs)
    }

    /// The configured catalog, or the stock one.
    pub fn catalog(&self) -> Result<RewardCatalog, CoreError> {
        match &self.catalog_path {
            Some(path) => RewardCatalog::load(path),
            None => Ok(RewardCatalog::default()),
        }
    }
}

/// Keys that may be absent from the JSON view because they are unset.
const OPTIONAL_KEYS: [&str; 2] = ["catalog_path", "celebration.seed"];

fn parse_number(value: &str) -> Option<serde_json::Value> {
    if let Ok(n) = value.parse::<i64>() {
        Some(serde_json::Value::Number(n.into()))
    } else {
        value
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn default_start_is_reference_midnight() {
        let cfg = Config::default();
        assert_eq!(
            cfg.calendar.default_start.to_rfc3339(),
            "2025-09-01T00:00:00-06:00"
        );
        assert_eq!(
            cfg.default_start_utc(),
            Utc.with_ymd_and_hms(2025, 9, 1, 6, 0, 0).unwrap()
        );
    }

    #[test]
    fn empty_file_uses_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn partial_file_fills_missing_sections() {
        let parsed: Config = toml::from_str("[hold]\nduration_ms = 3000\n").unwrap();
        assert_eq!(parsed.hold.duration_ms, 3000);
        assert_eq!(parsed.hold.tick_ms, 50);
        assert_eq!(parsed.celebration, CelebrationConfig::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("hold.duration_ms").as_deref(), Some("5000"));
        assert_eq!(
            cfg.get("calendar.reference_offset_minutes").as_deref(),
            Some("-360")
        );
        assert!(cfg.get("hold.missing_key").is_none());
    }

    #[test]
    fn apply_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.apply("hold.duration_ms", "2500").unwrap();
        assert_eq!(cfg.hold_duration(), Duration::from_millis(2500));
    }

    #[test]
    fn apply_updates_start_instant() {
        let mut cfg = Config::default();
        cfg.apply("calendar.default_start", "2026-01-05T00:00:00-07:00")
            .unwrap();
        assert_eq!(
            cfg.default_start_utc(),
            Utc.with_ymd_and_hms(2026, 1, 5, 7, 0, 0).unwrap()
        );
    }

    #[test]
    fn apply_sets_optional_values() {
        let mut cfg = Config::default();
        cfg.apply("celebration.seed", "42").unwrap();
        assert_eq!(cfg.celebration.seed, Some(42));
        cfg.apply("catalog_path", "/tmp/catalog.toml").unwrap();
        assert_eq!(cfg.catalog_path, Some(PathBuf::from("/tmp/catalog.toml")));
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("hold.nonexistent_key", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.apply("", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn apply_rejects_invalid_values() {
        let mut cfg = Config::default();
        assert!(cfg.apply("hold.tick_ms", "fast").is_err());
        assert!(cfg.apply("hold.duration_ms", "0").is_err());
        assert!(cfg.apply("calendar.default_start", "yesterday").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_and_load_preserve_changes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.apply("celebration.particles_per_burst", "12").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }
}
