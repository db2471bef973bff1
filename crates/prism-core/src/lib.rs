//! Prism Core - text-to-image generation against a slow-starting inference API.
//!
//! Prism sends a prompt to a hosted model once per requested image. If the
//! model is still loading, it polls with a bounded, fixed-delay retry. The
//! results come back as an ordered gallery that can be exported as PNG,
//! JPEG or WebP.
//!
//! # Architecture
//!
//! ```text
//! prompt → GenerationRequest → Fetcher (per image: request → classify → retry?) → Gallery → export
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use prism_core::{resolve_credential, Config, Fetcher, GenerationRequest};
//!
//! #[tokio::main]
//! async fn main() -> prism_core::Result<()> {
//!     let config = Config::load()?;
//!     let credential = resolve_credential(&config.env_file(), &config.credentials.token_key)?;
//!     let fetcher = Fetcher::from_config(&config)?;
//!
//!     let request = GenerationRequest::new("a lighthouse at dusk", &config.inference.default_model, 2)?;
//!     let images = fetcher
//!         .fetch_images(&request, credential.as_ref(), |p| eprintln!("{}", p.status_text()))
//!         .await?;
//!     println!("Got {} images", images.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod inference;
pub mod output;
pub mod present;
pub mod session;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use credentials::{resolve_credential, Credential, EnvFile};
pub use error::{ConfigError, ExportError, GenerationError, GenerationResult, PrismError, Result};
pub use inference::{CancelToken, Fetcher, HttpBackend, InferenceBackend, RetryPolicy};
pub use output::{ExportRecord, OutputFormat, OutputWriter};
pub use present::{export_as, present, ExportFormat, ExportedImage, Gallery, ImageCard, PresentOptions};
pub use session::{Session, SubmitInput, ViewState};
pub use types::{AttemptResult, FetchProgress, GenerationRequest, ImageResult};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_fetcher_from_default_config() {
        let fetcher = Fetcher::from_config(&Config::default()).unwrap();
        assert_eq!(fetcher.backend_name(), "huggingface");
        assert_eq!(fetcher.policy(), RetryPolicy::new(5, 2000));
    }
}
