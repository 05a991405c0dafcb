use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::score::DEFAULT_RECORD_CAPACITY;
use crate::sim::{ClockConfig, DifficultyConfig, EffectCatalogue, JoystickConfig};

pub const MATCH_CONFIG_ENV_VAR: &str = "SURVIVAL_MATCH_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub points_per_kill: u64,
    pub record_capacity: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            points_per_kill: 100,
            record_capacity: DEFAULT_RECORD_CAPACITY,
        }
    }
}

/// Tuning for one match. Every section falls back to its defaults when
/// omitted from an override file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub clock: ClockConfig,
    pub difficulty: DifficultyConfig,
    pub joystick: JoystickConfig,
    pub scoring: ScoringConfig,
    pub effects: EffectCatalogue,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read match config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse match config at {json_path}: {source}")]
    Parse {
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid match config value {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl MatchConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let config: MatchConfig = serde_path_to_error::deserialize(&mut deserializer).map_err(
            |error| {
                let json_path = error.path().to_string();
                ConfigError::Parse {
                    json_path,
                    source: error.into_inner(),
                }
            },
        )?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Reads the override named by `SURVIVAL_MATCH_CONFIG`, falling back to
    /// defaults with a warning when it is unset, unreadable or invalid.
    pub fn from_env_or_default() -> Self {
        match env::var(MATCH_CONFIG_ENV_VAR) {
            Ok(value) => match Self::load(Path::new(&value)) {
                Ok(config) => {
                    info!(path = value.as_str(), "match_config_loaded");
                    config
                }
                Err(error) => {
                    warn!(
                        env_var = MATCH_CONFIG_ENV_VAR,
                        error = %error,
                        "invalid match config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(env::VarError::NotPresent) => Self::default(),
            Err(error) => {
                warn!(
                    env_var = MATCH_CONFIG_ENV_VAR,
                    error = %error,
                    "unable to read match config env var; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive(
            "difficulty.wave_duration_seconds",
            self.difficulty.wave_duration_seconds,
        )?;
        positive(
            "clock.max_frame_delta_seconds",
            self.clock.max_frame_delta_seconds,
        )?;
        positive(
            "clock.default_frame_seconds",
            self.clock.default_frame_seconds,
        )?;
        non_negative(
            "difficulty.min_fire_interval_seconds",
            self.difficulty.min_fire_interval_seconds,
        )?;
        for (field, growth) in [
            ("difficulty.speed_growth", self.difficulty.speed_growth),
            ("difficulty.health_growth", self.difficulty.health_growth),
            ("difficulty.count_growth", self.difficulty.count_growth),
        ] {
            positive(field, f64::from(growth))?;
        }
        if self.scoring.record_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "scoring.record_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        for definition in self.effects.definitions() {
            if definition.duration_seconds.is_nan() || definition.duration_seconds < 0.0 {
                return Err(ConfigError::Invalid {
                    field: "effects.duration_seconds",
                    reason: format!(
                        "{} has duration {}",
                        definition.kind.as_token(),
                        definition.duration_seconds
                    ),
                });
            }
            let driven = definition.action.kind();
            if driven != definition.kind {
                return Err(ConfigError::Invalid {
                    field: "effects.action",
                    reason: format!(
                        "{} carries a {} action",
                        definition.kind.as_token(),
                        driven.as_token()
                    ),
                });
            }
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected a positive number, got {value}"),
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected a non-negative number, got {value}"),
        })
    }
}
