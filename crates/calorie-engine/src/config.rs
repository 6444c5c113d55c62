//! Configuration types for the calorie client.
//!
//! The configuration is a small JSON file. Every field has a default, so a
//! missing file or a partial file is always usable.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default location of the configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".calorie/config.json";

/// Main configuration for the calorie client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the estimation API (scheme, host and port).
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Path of the estimation endpoint under the base URL.
    #[serde(default = "default_estimate_path")]
    pub estimate_path: String,

    /// UI tick rate in milliseconds (drives the pending animation).
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:4000".into()
}

fn default_estimate_path() -> String {
    "/api/estimate-calories".into()
}

fn default_tick_rate_ms() -> u64 {
    250
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            estimate_path: default_estimate_path(),
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Load configuration, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Override the API base URL (from a flag or environment variable).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Full URL of the estimation endpoint.
    pub fn endpoint(&self) -> String {
        let base = self.api_base_url.trim_end_matches('/');
        let path = self.estimate_path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}
