//! Engine configuration
//!
//! Every tunable constant of the turn engine lives here. Configs are plain
//! serde structs so they can be loaded from JSON; missing fields fall back to
//! the reference defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Tunable engine parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub fov_radius: i32,

    pub fire_spread_probability: f64,
    pub fire_dissipate_probability: f64,

    pub steam_spread_probability: f64,
    pub steam_dissipate_probability: f64,
    pub steam_spread_decay: f64,
    pub steam_dissipate_growth: f64,

    pub spawn_max_tries: u32,
    pub inventory_capacity: usize,
    pub recently_harmed_limit: usize,

    pub swim_stamina: i32,
    pub drown_damage: i32,
    pub stamina_regen: i32,

    pub necrotic_damage: i32,
    pub burn_damage: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fov_radius: DEFAULT_FOV_RADIUS,
            fire_spread_probability: FIRE_SPREAD_PROBABILITY,
            fire_dissipate_probability: FIRE_DISSIPATE_PROBABILITY,
            steam_spread_probability: STEAM_SPREAD_PROBABILITY,
            steam_dissipate_probability: STEAM_DISSIPATE_PROBABILITY,
            steam_spread_decay: STEAM_SPREAD_DECAY,
            steam_dissipate_growth: STEAM_DISSIPATE_GROWTH,
            spawn_max_tries: SPAWN_MAX_TRIES,
            inventory_capacity: INVENTORY_CAPACITY,
            recently_harmed_limit: RECENTLY_HARMED_LIMIT,
            swim_stamina: SWIM_STAMINA,
            drown_damage: DROWN_DAMAGE,
            stamina_regen: STAMINA_REGEN,
            necrotic_damage: NECROTIC_DAMAGE,
            burn_damage: BURN_DAMAGE,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::CouldNotRead {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Self::from_json_str(&contents)
    }

    /// Check every value against its legal range
    pub fn validate(&self) -> Result<(), ConfigError> {
        let probabilities = [
            ("fire_spread_probability", self.fire_spread_probability),
            ("fire_dissipate_probability", self.fire_dissipate_probability),
            ("steam_spread_probability", self.steam_spread_probability),
            ("steam_dissipate_probability", self.steam_dissipate_probability),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value,
                    range: "[0, 1]",
                });
            }
        }

        // Decay below one and growth above zero are what make steam die out.
        if !(0.0..1.0).contains(&self.steam_spread_decay) {
            return Err(ConfigError::OutOfRange {
                field: "steam_spread_decay",
                value: self.steam_spread_decay,
                range: "[0, 1)",
            });
        }
        if !(self.steam_dissipate_growth > 0.0 && self.steam_dissipate_growth <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "steam_dissipate_growth",
                value: self.steam_dissipate_growth,
                range: "(0, 1]",
            });
        }

        if self.fov_radius <= 0 {
            return Err(ConfigError::Zero {
                field: "fov_radius",
            });
        }
        if self.spawn_max_tries == 0 {
            return Err(ConfigError::Zero {
                field: "spawn_max_tries",
            });
        }
        if self.inventory_capacity == 0 {
            return Err(ConfigError::Zero {
                field: "inventory_capacity",
            });
        }
        if self.swim_stamina <= 0 {
            return Err(ConfigError::Zero {
                field: "swim_stamina",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "fov_radius": 4 }"#).unwrap();
        assert_eq!(config.fov_radius, 4);
        assert_eq!(config.inventory_capacity, INVENTORY_CAPACITY);
    }

    #[test]
    fn test_probability_out_of_range() {
        let err = EngineConfig::from_json_str(r#"{ "fire_spread_probability": 1.5 }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "fire_spread_probability",
                ..
            }
        ));
    }

    #[test]
    fn test_decay_must_shrink() {
        let err = EngineConfig::from_json_str(r#"{ "steam_spread_decay": 1.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = EngineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::load(Path::new("/nonexistent/delve.json")).unwrap_err();
        assert!(matches!(err, ConfigError::CouldNotRead { .. }));
    }
}
