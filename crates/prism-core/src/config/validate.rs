//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::output::OutputFormat;
use crate::present::ExportFormat;

use super::types::MAX_IMAGES_PER_REQUEST;
use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.inference.endpoint.starts_with("http") {
            return Err(ConfigError::ValidationError(
                "inference.endpoint must be an http(s) URL".into(),
            ));
        }
        if self.inference.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "inference.timeout_ms must be > 0".into(),
            ));
        }
        if self.inference.allowed_models.is_empty() {
            return Err(ConfigError::ValidationError(
                "inference.allowed_models must not be empty".into(),
            ));
        }
        if !self.inference.is_allowed(&self.inference.default_model) {
            return Err(ConfigError::ValidationError(format!(
                "inference.default_model '{}' is not in inference.allowed_models",
                self.inference.default_model
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be > 0".into(),
            ));
        }
        if self.generation.max_count == 0 || self.generation.max_count > MAX_IMAGES_PER_REQUEST {
            return Err(ConfigError::ValidationError(format!(
                "generation.max_count must be between 1 and {MAX_IMAGES_PER_REQUEST}"
            )));
        }
        if self.generation.default_count == 0
            || self.generation.default_count > self.generation.max_count
        {
            return Err(ConfigError::ValidationError(
                "generation.default_count must be between 1 and generation.max_count".into(),
            ));
        }
        if self.credentials.token_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "credentials.token_key must not be empty".into(),
            ));
        }
        if ExportFormat::parse(&self.export.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "export.format must be png, jpg or webp (got '{}')",
                self.export.format
            )));
        }
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be json or jsonl (got '{}')",
                self.output.format
            )));
        }
        if self.export.filename_prefix.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "export.filename_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }
}
