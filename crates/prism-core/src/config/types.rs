//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Default inference endpoint (one model per path segment).
pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/models";

/// Default text-to-image model.
pub const DEFAULT_MODEL: &str = "stabilityai/stable-diffusion-xl-base-1.0";

/// Inference API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Base URL; the model identifier is appended as a path segment
    pub endpoint: String,

    /// Model used when none is given
    pub default_model: String,

    /// Models the user may pick from
    pub allowed_models: Vec<String>,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            allowed_models: vec![
                DEFAULT_MODEL.to_string(),
                "stabilityai/stable-diffusion-2-1".to_string(),
                "runwayml/stable-diffusion-v1-5".to_string(),
                "black-forest-labs/FLUX.1-schnell".to_string(),
            ],
            timeout_ms: 120_000,
        }
    }
}

impl InferenceConfig {
    /// Whether `model` is one of the allowed identifiers.
    pub fn is_allowed(&self, model: &str) -> bool {
        self.allowed_models.iter().any(|m| m == model)
    }
}

/// Retry settings for a model that is still warming up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per image (first request included)
    pub max_attempts: u32,

    /// Fixed delay between attempts in milliseconds
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_ms: 2000,
        }
    }
}

/// Hard ceiling for `generation.max_count`.
pub const MAX_IMAGES_PER_REQUEST: u32 = 16;

/// Batch size settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Images per request when the user does not say
    pub default_count: u32,

    /// Upper bound on images per request
    pub max_count: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_count: 1,
            max_count: 4,
        }
    }
}

/// Where the API token comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// key=value file holding the token (supports ~)
    pub env_file: String,

    /// Key to look up in the env file, then in the process environment
    pub token_key: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            env_file: ".env".to_string(),
            token_key: "HUGGINGFACE_API_TOKEN".to_string(),
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Default format: "png", "jpg" or "webp"
    pub format: String,

    /// Directory exported files are written to (supports ~)
    pub output_dir: String,

    /// Stem prefix for generated filenames
    pub filename_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: "png".to_string(),
            output_dir: ".".to_string(),
            filename_prefix: "ai-image".to_string(),
        }
    }
}

/// Manifest output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Manifest format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
