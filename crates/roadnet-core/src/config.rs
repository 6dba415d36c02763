//! Session configuration.

use crate::network::StaleTurnPolicy;
use crate::viewport::ViewportConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Invalid config: {0}")]
    Parse(String),
    #[error("Invalid zoom bounds: min {min} must be positive and not above max {max}")]
    ZoomBounds { min: f64, max: f64 },
}

/// Tunables for an editing session. Every field has a default, so a config
/// file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub viewport: ViewportConfig,
    /// Extra pick distance around elements, in screen pixels.
    pub hit_tolerance: f64,
    /// What deleting a road does to turning volumes that reference it.
    pub stale_turns: StaleTurnPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportConfig::default(),
            hit_tolerance: 3.0,
            stale_turns: StaleTurnPolicy::default(),
        }
    }
}

impl SessionConfig {
    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let ViewportConfig {
            min_scale,
            max_scale,
            ..
        } = self.viewport;
        if !(min_scale > 0.0 && min_scale <= max_scale) {
            return Err(ConfigError::ZoomBounds {
                min: min_scale,
                max: max_scale,
            });
        }
        Ok(())
    }
}
