//! Configuration management for modelprobe.
//!
//! Configuration is loaded from the platform config directory with defaults
//! for every field, so an absent file is a valid setup.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Probe run settings
    pub probe: ProbeConfig,

    /// Report dump settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Hosted provider settings
    pub providers: ProvidersConfig,

    /// Fallback priority
    pub cascade: CascadeConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.modelprobe.modelprobe/config.toml
    /// - Linux: ~/.config/modelprobe/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\modelprobe\config\config.toml
    ///
    /// Falls back to ~/.modelprobe/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "modelprobe", "modelprobe")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = shellexpand::tilde("~").into_owned();
                PathBuf::from(home).join(".modelprobe").join("config.toml")
            })
    }

    /// Run-wide request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.probe.timeout_ms)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
