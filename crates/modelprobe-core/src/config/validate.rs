//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::llm::provider::KNOWN_PROVIDERS;

use super::Config;

/// Largest generated test image edge, in pixels.
pub const MAX_IMAGE_SIZE: u32 = 1024;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.probe.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "probe.timeout_ms must be > 0".into(),
            ));
        }
        if self.probe.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "probe.max_tokens must be > 0".into(),
            ));
        }
        if self.probe.excerpt_chars == 0 {
            return Err(ConfigError::ValidationError(
                "probe.excerpt_chars must be > 0".into(),
            ));
        }
        if self.probe.image_size == 0 || self.probe.image_size > MAX_IMAGE_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "probe.image_size must be between 1 and {MAX_IMAGE_SIZE}"
            )));
        }
        for name in &self.cascade.order {
            if !KNOWN_PROVIDERS.contains(&name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "cascade.order names unknown provider '{name}' (expected one of: {})",
                    KNOWN_PROVIDERS.join(", ")
                )));
            }
        }
        for (name, enabled, models, timeout_ms) in self.providers.sections() {
            if enabled && models.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "providers.{name}.models must not be empty while enabled"
                )));
            }
            if timeout_ms == Some(0) {
                return Err(ConfigError::ValidationError(format!(
                    "providers.{name}.timeout_ms must be > 0"
                )));
            }
        }
        Ok(())
    }
}
