//! operator‑tunable settings, loadable from JSON
//!
//! Every section falls back to the calibrated defaults in `constants.rs`
//! field by field, so a config file only needs the values it changes.

use std::fs;
use std::path::Path;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

#[derive(Resource, Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub depth: DepthConfig,
    pub window: WindowConfig,
    pub population: PopulationConfig,
    pub lifecycle: LifecycleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthConfig {
    /// Depth units per pixel of wheel / drag travel.
    pub wheel_sensitivity: f64,
    /// Exponential approach rate of the displayed depth, per second.
    pub smoothing_rate: f64,
    pub jump_duration_secs: f64,
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            wheel_sensitivity: WHEEL_SENSITIVITY,
            smoothing_rate: DEPTH_SMOOTHING,
            jump_duration_secs: JUMP_DURATION_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub underground_radius: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { underground_radius: UNDERGROUND_RADIUS }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub surface_budget: usize,
    pub underground_min: usize,
    pub underground_max: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            surface_budget: SURFACE_BUDGET,
            underground_min: UNDERGROUND_COUNT_MIN,
            underground_max: UNDERGROUND_COUNT_MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub viewport_half_width: f64,
    pub viewport_half_height: f64,
    pub visibility_margin: f64,
    pub pool_capacity_per_kind: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            viewport_half_width: VIEWPORT_HALF_WIDTH,
            viewport_half_height: VIEWPORT_HALF_HEIGHT,
            visibility_margin: VISIBILITY_MARGIN,
            pool_capacity_per_kind: POOL_CAPACITY_PER_KIND,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !positive(self.depth.wheel_sensitivity) {
            return Err(ConfigError::Invalid("depth.wheel_sensitivity must be > 0"));
        }
        if !positive(self.depth.smoothing_rate) {
            return Err(ConfigError::Invalid("depth.smoothing_rate must be > 0"));
        }
        if !positive(self.depth.jump_duration_secs) {
            return Err(ConfigError::Invalid("depth.jump_duration_secs must be > 0"));
        }
        if !positive(self.window.underground_radius) {
            return Err(ConfigError::Invalid("window.underground_radius must be > 0"));
        }
        if self.population.underground_min > self.population.underground_max {
            return Err(ConfigError::Invalid(
                "population.underground_min exceeds population.underground_max",
            ));
        }
        if !positive(self.lifecycle.viewport_half_width)
            || !positive(self.lifecycle.viewport_half_height)
        {
            return Err(ConfigError::Invalid("lifecycle viewport extents must be > 0"));
        }
        if !(self.lifecycle.visibility_margin >= 0.0) {
            return Err(ConfigError::Invalid("lifecycle.visibility_margin must be >= 0"));
        }
        if self.lifecycle.pool_capacity_per_kind == 0 {
            return Err(ConfigError::Invalid("lifecycle.pool_capacity_per_kind must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg = EngineConfig::from_json_str(
            r#"{ "window": { "underground_radius": 400.0 },
                 "lifecycle": { "pool_capacity_per_kind": 8 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.window.underground_radius, 400.0);
        assert_eq!(cfg.lifecycle.pool_capacity_per_kind, 8);
        assert_eq!(cfg.lifecycle.visibility_margin, VISIBILITY_MARGIN);
        assert_eq!(cfg.depth, DepthConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = EngineConfig::from_json_str(
            r#"{ "population": { "underground_min": 7, "underground_max": 3 } }"#,
        );
        assert!(matches!(err, Err(ConfigError::Invalid(_))));

        let err = EngineConfig::from_json_str(r#"{ "lifecycle": { "pool_capacity_per_kind": 0 } }"#);
        assert!(matches!(err, Err(ConfigError::Invalid(_))));

        let err = EngineConfig::from_json_str("{ not json");
        assert!(matches!(err, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EngineConfig::load("/definitely/not/here/strata.json");
        assert!(matches!(err, Err(ConfigError::Io(_))));
    }
}
