//! Configuration management for Prism.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section is optional in the TOML file.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Prism.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inference API settings
    pub inference: InferenceConfig,

    /// Model-loading retry settings
    pub retry: RetryConfig,

    /// Batch size settings
    pub generation: GenerationConfig,

    /// API token source
    pub credentials: CredentialsConfig,

    /// Export settings
    pub export: ExportConfig,

    /// Manifest output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
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
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.prism.prism/config.toml
    /// - Linux: ~/.config/prism/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\prism\config\config.toml
    ///
    /// Falls back to ~/.prism/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "prism", "prism")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".prism").join("config.toml")
            })
    }

    /// Resolved env file path (with ~ expansion).
    pub fn env_file(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.credentials.env_file).into_owned())
    }

    /// Resolved export directory (with ~ expansion).
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.export.output_dir).into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.backoff_ms, 2000);
        assert_eq!(config.generation.default_count, 1);
        assert_eq!(config.credentials.token_key, "HUGGINGFACE_API_TOKEN");
        assert!(config.inference.is_allowed(DEFAULT_MODEL));
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[inference]"));
        assert!(toml.contains("[retry]"));
        assert!(toml.contains("max_attempts = 5"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml("[retry]\nbackoff_ms = 250\n").unwrap();
        assert_eq!(config.retry.backoff_ms, 250);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.export.format, "png");
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[retry]\nmax_attempts = 0\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_load_from_missing_file_is_read_error() {
        let err = Config::load_from(Path::new("/nonexistent/prism/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError(_)));
    }

    #[test]
    fn test_tilde_expansion_in_paths() {
        let mut config = Config::default();
        config.export.output_dir = "~/Pictures/prism".to_string();
        assert!(config.output_dir().ends_with("Pictures/prism"));
    }
}
