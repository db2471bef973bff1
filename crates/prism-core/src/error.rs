//! Error types for Prism.
//!
//! Errors are split by concern: configuration, generation (the fetch/retry
//! loop), and export. Every fatal generation outcome maps to exactly one
//! `GenerationError` variant so the UI can show a single message per batch.

use thiserror::Error;

/// Top-level error type for Prism operations.
#[derive(Error, Debug)]
pub enum PrismError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Image generation errors
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Export (re-encode / save) errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a config or credential file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// No API token was found in the env file or the environment
    #[error("Missing credential: add {key} to your .env file or environment")]
    MissingCredential { key: String },
}

/// Errors that abort a generation batch.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Configuration problem detected before any request was sent
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The request itself was rejected locally (empty prompt, bad count, unknown model)
    #[error("{0}")]
    InvalidRequest(String),

    /// The API answered with something that is neither an image nor a structured error
    #[error("Received invalid response format (HTTP {status})")]
    InvalidResponseFormat { status: u16 },

    /// The API returned a structured, non-loading error
    #[error("API error (HTTP {status}): {message}")]
    RemoteApi { status: u16, message: String },

    /// The model kept reporting that it is loading
    #[error("Exhausted retries after {attempts} attempts: {last_reason}")]
    RetriesExhausted { attempts: u32, last_reason: String },

    /// Connection-level failure (DNS, TLS, reset)
    #[error("Request failed: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The batch was cancelled by the caller
    #[error("Generation cancelled")]
    Cancelled,
}

/// Per-image export errors. These never abort presentation of other images.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Source bytes could not be decoded
    #[error("Cannot decode image {index}: {message}")]
    Decode { index: usize, message: String },

    /// Re-encoding into the target format failed
    #[error("Cannot encode image {index} as {format}: {message}")]
    Encode {
        index: usize,
        format: String,
        message: String,
    },

    /// The requested filename stem is unusable
    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    /// No image at this position in the gallery
    #[error("No image at index {0}")]
    NoSuchImage(usize),

    /// Unknown export format token
    #[error("Unsupported export format: {0} (expected png, jpg or webp)")]
    UnsupportedFormat(String),

    /// Writing the exported file failed
    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Prism results.
pub type Result<T> = std::result::Result<T, PrismError>;

/// Convenience type alias for generation results.
pub type GenerationResult<T> = std::result::Result<T, GenerationError>;
