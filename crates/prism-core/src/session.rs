//! UI-facing session: idle / loading / results / error.
//!
//! A `Session` owns the fetcher, the resolved credential and the current
//! view state. Each submit replaces the previous gallery before any request
//! goes out, and every batch ends in exactly one of `Results` or `Error`.

use crate::config::{Config, GenerationConfig, InferenceConfig};
use crate::credentials::Credential;
use crate::error::{GenerationError, GenerationResult};
use crate::inference::{CancelToken, Fetcher};
use crate::present::{present, Gallery, PresentOptions};
use crate::types::{FetchProgress, GenerationRequest};

/// What the UI should currently show.
#[derive(Debug, Default)]
pub enum ViewState {
    #[default]
    Idle,
    /// A batch is running; `status` is the latest progress line
    Loading { status: String },
    Results(Gallery),
    Error { message: String },
}

impl ViewState {
    pub fn gallery(&self) -> Option<&Gallery> {
        match self {
            ViewState::Results(gallery) => Some(gallery),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ViewState::Error { message } => Some(message.as_str()),
            _ => None,
        }
    }
}

/// User input for one submission, before validation.
#[derive(Debug, Clone)]
pub struct SubmitInput {
    pub prompt: String,
    pub model: String,
    pub count: u32,
}

/// Interactive generation session.
pub struct Session {
    fetcher: Fetcher,
    credential: Option<Credential>,
    inference: InferenceConfig,
    generation: GenerationConfig,
    filename_prefix: String,
    state: ViewState,
}

impl Session {
    pub fn new(fetcher: Fetcher, credential: Option<Credential>, config: &Config) -> Self {
        Self {
            fetcher,
            credential,
            inference: config.inference.clone(),
            generation: config.generation.clone(),
            filename_prefix: config.export.filename_prefix.clone(),
            state: ViewState::Idle,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Drop any results or error and go back to idle.
    pub fn reset(&mut self) {
        self.state = ViewState::Idle;
    }

    /// Move the current gallery out, leaving the session idle.
    ///
    /// Returns `None` (and keeps the state) unless the last batch succeeded.
    pub fn take_gallery(&mut self) -> Option<Gallery> {
        match std::mem::take(&mut self.state) {
            ViewState::Results(gallery) => Some(gallery),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Validate user input against the allowed models and batch limits.
    pub fn validate(&self, input: &SubmitInput) -> GenerationResult<GenerationRequest> {
        let request = GenerationRequest::new(&input.prompt, &input.model, input.count)?;
        if !self.inference.is_allowed(request.model()) {
            return Err(GenerationError::InvalidRequest(format!(
                "Unknown model '{}'. Choose one of: {}",
                request.model(),
                self.inference.allowed_models.join(", ")
            )));
        }
        if request.count() > self.generation.max_count {
            return Err(GenerationError::InvalidRequest(format!(
                "Number of images must be between 1 and {}.",
                self.generation.max_count
            )));
        }
        Ok(request)
    }

    /// Run one batch and land in `Results` or `Error`.
    ///
    /// `on_progress` sees every status update while the state is `Loading`.
    pub async fn submit<F>(
        &mut self,
        input: &SubmitInput,
        cancel: &CancelToken,
        mut on_progress: F,
    ) -> &ViewState
    where
        F: FnMut(&FetchProgress),
    {
        // Release the previous batch before anything else.
        self.state = ViewState::Idle;

        let request = match self.validate(input) {
            Ok(request) => request,
            Err(e) => return self.fail(e),
        };

        self.state = ViewState::Loading {
            status: "Generating images...".to_string(),
        };

        let state = &mut self.state;
        let outcome = self
            .fetcher
            .fetch_images_with_cancel(&request, self.credential.as_ref(), cancel, |progress| {
                *state = ViewState::Loading {
                    status: progress.status_text(),
                };
                on_progress(&progress);
            })
            .await;

        match outcome {
            Ok(results) => {
                let gallery = present(results, &PresentOptions::now(&self.filename_prefix));
                self.state = ViewState::Results(gallery);
                &self.state
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: GenerationError) -> &ViewState {
        tracing::debug!("Generation failed: {error}");
        self.state = ViewState::Error {
            message: error.to_string(),
        };
        &self.state
    }
}
