//! Game tunables.
//!
//! A single `GameConfig` is loaded once (usually from `data/game_config.json`)
//! and handed explicitly to everything that needs it. Fields missing from the
//! JSON keep their defaults, so a file only has to name what it overrides.
//!
//! ```
//! use sinkship_logic::config::GameConfig;
//!
//! let config = GameConfig::from_json_str(r#"{ "repair_hits_needed": 3 }"#).unwrap();
//! assert_eq!(config.repair_hits_needed, 3);
//! assert_eq!(config.walk_speed, 2.0);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Length of the downward feet ray used for ground contact.
pub const GROUND_PROBE_DISTANCE: f32 = 0.1;

/// Global game settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub walk_speed: f32,
    pub climb_speed: f32,
    /// Axis magnitude below which directional input counts as none.
    pub direction_input_min_threshold: f32,
    /// Downward acceleration applied by the controller while airborne.
    /// Gravity is done by hand so movement can stay kinematic.
    pub gravity: f32,
    /// Downward acceleration for a dead body whose head is above water.
    /// Lower than `gravity` so a body hitting the surface isn't pushed far under.
    pub dead_gravity: f32,
    /// Downward acceleration for a dead body whose head is under water.
    /// Negative, so bodies float up.
    pub buoyancy: f32,
    pub descend_time_in_seconds: f32,
    pub o2_seconds: f32,
    pub flash_interval_seconds: f32,
    /// Camera pan from sky to ship at game start.
    pub pan_to_ship_seconds: f32,
    /// Hammer hits to repair one breach.
    pub repair_hits_needed: u32,
    /// Fraction of rooms that must be leaking for the ship to sink.
    pub percentage_for_sink: f32,
    /// Fraction of the depth range sunk per second at maximum leakage.
    pub max_sink_percent_per_second: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            walk_speed: 2.0,
            climb_speed: 1.0,
            direction_input_min_threshold: 0.1,
            gravity: 20.0,
            dead_gravity: 10.0,
            buoyancy: -0.1,
            descend_time_in_seconds: 90.0,
            o2_seconds: 10.0,
            flash_interval_seconds: 0.5,
            pan_to_ship_seconds: 10.0,
            repair_hits_needed: 5,
            percentage_for_sink: 0.1,
            max_sink_percent_per_second: 0.01,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON settings document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        let issues = config.validate();
        if !issues.is_empty() {
            return Err(ConfigError::Invalid(issues));
        }
        Ok(config)
    }

    /// Load settings from a file. A missing file is an error, not a fallback
    /// to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded game config from {}", path.display());
        Ok(config)
    }

    /// Check every tunable, returning all problems found.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.repair_hits_needed == 0 {
            issues.push(ConfigIssue::ZeroRepairHits);
        }

        let positive = [
            ("walk_speed", self.walk_speed),
            ("climb_speed", self.climb_speed),
            ("gravity", self.gravity),
            ("dead_gravity", self.dead_gravity),
            ("descend_time_in_seconds", self.descend_time_in_seconds),
            ("o2_seconds", self.o2_seconds),
            ("flash_interval_seconds", self.flash_interval_seconds),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                issues.push(ConfigIssue::NotPositive(name));
            }
        }

        if !self.buoyancy.is_finite() {
            issues.push(ConfigIssue::NotFinite("buoyancy"));
        }
        if !self.pan_to_ship_seconds.is_finite() || self.pan_to_ship_seconds < 0.0 {
            issues.push(ConfigIssue::NotPositive("pan_to_ship_seconds"));
        }

        if !(0.0..1.0).contains(&self.direction_input_min_threshold) {
            issues.push(ConfigIssue::OutOfUnitRange("direction_input_min_threshold"));
        }
        if !(0.0..=1.0).contains(&self.percentage_for_sink) {
            issues.push(ConfigIssue::OutOfUnitRange("percentage_for_sink"));
        }
        if !(0.0..=1.0).contains(&self.max_sink_percent_per_second) {
            issues.push(ConfigIssue::OutOfUnitRange("max_sink_percent_per_second"));
        }

        issues
    }
}

/// A single validation problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    /// A breach could never be repaired.
    ZeroRepairHits,
    /// Field must be a finite value greater than zero.
    NotPositive(&'static str),
    NotFinite(&'static str),
    /// Field must lie in 0..=1.
    OutOfUnitRange(&'static str),
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigIssue::ZeroRepairHits => write!(f, "repair_hits_needed must be at least 1"),
            ConfigIssue::NotPositive(name) => write!(f, "{} must be positive", name),
            ConfigIssue::NotFinite(name) => write!(f, "{} must be finite", name),
            ConfigIssue::OutOfUnitRange(name) => write!(f, "{} must be between 0 and 1", name),
        }
    }
}

/// Errors that can occur while loading the config
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(Vec<ConfigIssue>),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Missing game config: {}", e),
            ConfigError::Parse(e) => write!(f, "Malformed game config: {}", e),
            ConfigError::Invalid(issues) => {
                write!(f, "Invalid game config: ")?;
                for (i, issue) in issues.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", issue)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}
