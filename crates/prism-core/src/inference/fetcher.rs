//! Retry-orchestrated fetcher: one request loop per image, run sequentially.
//!
//! Each image moves through `Requesting -> {Succeeded | WaitingToRetry ->
//! Requesting | Failed}`. A batch is all-or-nothing: the first fatal or
//! exhausted image aborts it and the images already fetched are dropped.

use super::cancel::CancelToken;
use super::classify::classify;
use super::client::{HttpBackend, InferenceBackend};
use super::retry::RetryPolicy;
use crate::config::{Config, CredentialsConfig};
use crate::credentials::Credential;
use crate::error::{ConfigError, GenerationError, GenerationResult};
use crate::types::{AttemptResult, FetchProgress, GenerationRequest, ImageResult};

/// Sequential, retrying image fetcher.
pub struct Fetcher {
    backend: Box<dyn InferenceBackend>,
    policy: RetryPolicy,
    credential_key: String,
}

impl Fetcher {
    pub fn new(backend: Box<dyn InferenceBackend>, policy: RetryPolicy) -> Self {
        Self {
            backend,
            policy,
            credential_key: CredentialsConfig::default().token_key,
        }
    }

    /// Build an HTTP-backed fetcher from configuration.
    pub fn from_config(config: &Config) -> GenerationResult<Self> {
        let backend = HttpBackend::new(&config.inference)?;
        Ok(Self::new(Box::new(backend), RetryPolicy::from(&config.retry))
            .with_credential_key(&config.credentials.token_key))
    }

    /// Name of the credential key reported when the token is missing.
    pub fn with_credential_key(mut self, key: &str) -> Self {
        self.credential_key = key.to_string();
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Fetch all images of `request`, in order.
    ///
    /// `on_progress` receives non-fatal status updates (requesting, model
    /// loading, image ready). Returns every image or the first error.
    pub async fn fetch_images<F>(
        &self,
        request: &GenerationRequest,
        credential: Option<&Credential>,
        on_progress: F,
    ) -> GenerationResult<Vec<ImageResult>>
    where
        F: FnMut(FetchProgress),
    {
        self.fetch_images_with_cancel(request, credential, &CancelToken::new(), on_progress)
            .await
    }

    /// Like [`fetch_images`](Self::fetch_images), but stops with
    /// `GenerationError::Cancelled` as soon as `cancel` fires during a request
    /// or a backoff wait.
    pub async fn fetch_images_with_cancel<F>(
        &self,
        request: &GenerationRequest,
        credential: Option<&Credential>,
        cancel: &CancelToken,
        mut on_progress: F,
    ) -> GenerationResult<Vec<ImageResult>>
    where
        F: FnMut(FetchProgress),
    {
        let credential = credential.ok_or_else(|| ConfigError::MissingCredential {
            key: self.credential_key.clone(),
        })?;

        let total = request.count() as usize;
        let mut results = Vec::new();

        tracing::info!(
            "Generating {total} image(s) with {} via {}",
            request.model(),
            self.backend.name()
        );

        for index in 0..total {
            let image = self
                .fetch_one(request, credential, cancel, index, &mut on_progress)
                .await?;
            on_progress(FetchProgress::ImageReady {
                image: index,
                total,
            });
            results.push(image);
        }

        tracing::info!("Generated {} image(s)", results.len());
        Ok(results)
    }

    /// Run the bounded retry loop for a single image.
    async fn fetch_one<F>(
        &self,
        request: &GenerationRequest,
        credential: &Credential,
        cancel: &CancelToken,
        index: usize,
        on_progress: &mut F,
    ) -> GenerationResult<ImageResult>
    where
        F: FnMut(FetchProgress),
    {
        let total = request.count() as usize;
        let max_attempts = self.policy.max_attempts;
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(GenerationError::Cancelled);
            }

            attempt += 1;
            on_progress(FetchProgress::Requesting {
                image: index,
                total,
                attempt,
            });
            tracing::debug!(
                "Image {}/{total}: attempt {attempt}/{max_attempts}",
                index + 1
            );

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                response = self.backend.infer(request.model(), request.prompt(), credential) => response,
            };
            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!("Image {}/{total}: {e}", index + 1);
                    return Err(e);
                }
            };

            match classify(response) {
                AttemptResult::Success {
                    bytes,
                    content_type,
                } => {
                    tracing::debug!(
                        "Image {}/{total}: {} bytes of {content_type}",
                        index + 1,
                        bytes.len()
                    );
                    return Ok(ImageResult::new(index, bytes, content_type, request));
                }
                AttemptResult::Transient {
                    reason,
                    estimated_time,
                } => {
                    if !self.policy.can_retry(attempt) {
                        tracing::warn!(
                            "Image {}/{total}: model still loading after {attempt} attempts",
                            index + 1
                        );
                        return Err(GenerationError::RetriesExhausted {
                            attempts: attempt,
                            last_reason: reason,
                        });
                    }

                    tracing::info!(
                        "Model {} is still loading. Retrying in {:?} ({attempt}/{max_attempts})",
                        request.model(),
                        self.policy.backoff
                    );
                    on_progress(FetchProgress::ModelLoading {
                        image: index,
                        total,
                        attempt,
                        max_attempts,
                        estimated_time,
                    });

                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                        _ = tokio::time::sleep(self.policy.backoff) => {}
                    }
                }
                AttemptResult::Fatal(e) => {
                    tracing::debug!("Image {}/{total}: {e}", index + 1);
                    return Err(e);
                }
            }
        }
    }
}
