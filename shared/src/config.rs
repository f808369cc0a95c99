use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_VISIBILITY_THRESHOLD: f64 = 0.1;
pub const DEFAULT_STATUS_CLEAR_AFTER_MS: u64 = 2_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Validation(String),
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

/// Tunables handed to the core by its shell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Fraction of a card's area that must be on screen before it loads.
    pub visibility_threshold: f64,
    /// How long the settings save banner stays up.
    pub status_clear_after_ms: u64,
    /// Origin the shell sends API requests to. `None` means same-origin.
    pub api_base: Option<Url>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
            status_clear_after_ms: DEFAULT_STATUS_CLEAR_AFTER_MS,
            api_base: None,
        }
    }
}

impl CoreConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.visibility_threshold > 0.0 && self.visibility_threshold <= 1.0) {
            return Err(ConfigError::Validation(format!(
                "visibility_threshold must be in (0, 1], got {}",
                self.visibility_threshold
            )));
        }
        if self.status_clear_after_ms == 0 {
            return Err(ConfigError::Validation(
                "status_clear_after_ms must be > 0".into(),
            ));
        }
        if let Some(base) = &self.api_base {
            if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
                return Err(ConfigError::Validation(format!(
                    "api_base must be an http(s) origin, got {base}"
                )));
            }
        }
        Ok(())
    }

    pub fn status_clear_after(&self) -> Duration {
        Duration::from_millis(self.status_clear_after_ms)
    }
}
