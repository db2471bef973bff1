//! Core data types for a generation batch.
//!
//! A `GenerationRequest` goes into the fetcher; an ordered list of
//! `ImageResult`s comes out. `AttemptResult` is the classified outcome of a
//! single HTTP call, and `FetchProgress` is the non-fatal status stream the
//! UI shows while a batch runs.

use serde::Serialize;

use crate::error::GenerationError;

/// A validated, immutable request for `count` images of one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
    model: String,
    count: u32,
}

impl GenerationRequest {
    /// Build a request. The prompt is trimmed and must not be empty, the
    /// model must not be blank, and `count` must be at least 1.
    pub fn new(
        prompt: impl AsRef<str>,
        model: impl AsRef<str>,
        count: u32,
    ) -> Result<Self, GenerationError> {
        let prompt = prompt.as_ref().trim();
        if prompt.is_empty() {
            return Err(GenerationError::InvalidRequest(
                "Please enter a prompt to generate images.".to_string(),
            ));
        }
        let model = model.as_ref().trim();
        if model.is_empty() {
            return Err(GenerationError::InvalidRequest(
                "Please choose a model.".to_string(),
            ));
        }
        if count == 0 {
            return Err(GenerationError::InvalidRequest(
                "Number of images must be at least 1.".to_string(),
            ));
        }
        Ok(Self {
            prompt: prompt.to_string(),
            model: model.to_string(),
            count,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// One generated image, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResult {
    index: usize,
    bytes: Vec<u8>,
    content_type: String,
    prompt: String,
    model: String,
}

impl ImageResult {
    pub(crate) fn new(
        index: usize,
        bytes: Vec<u8>,
        content_type: String,
        request: &GenerationRequest,
    ) -> Self {
        Self {
            index,
            bytes,
            content_type,
            prompt: request.prompt().to_string(),
            model: request.model().to_string(),
        }
    }

    /// Zero-based position within the batch.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Raw image bytes exactly as the API returned them.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Content type reported by the API (e.g. "image/jpeg").
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The prompt this image was generated from.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Classified outcome of a single inference call.
#[derive(Debug)]
pub enum AttemptResult {
    /// Usable image payload
    Success { bytes: Vec<u8>, content_type: String },
    /// Model is still warming up; worth another attempt
    Transient {
        reason: String,
        /// Server's estimate of the remaining load time, in seconds
        estimated_time: Option<f64>,
    },
    /// Anything that retrying will not fix
    Fatal(GenerationError),
}

/// Progress signal emitted while a batch runs. Never terminal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FetchProgress {
    /// An inference request is about to go out
    Requesting {
        image: usize,
        total: usize,
        attempt: u32,
    },
    /// The model reported it is loading; a retry follows after the backoff
    ModelLoading {
        image: usize,
        total: usize,
        attempt: u32,
        max_attempts: u32,
        estimated_time: Option<f64>,
    },
    /// An image finished successfully
    ImageReady { image: usize, total: usize },
}

impl FetchProgress {
    /// Human-readable status line for the loading indicator.
    pub fn status_text(&self) -> String {
        match self {
            FetchProgress::Requesting {
                image,
                total,
                attempt,
            } => {
                if *attempt > 1 {
                    format!("Generating image {}/{total} (attempt {attempt})...", image + 1)
                } else {
                    format!("Generating image {}/{total}...", image + 1)
                }
            }
            FetchProgress::ModelLoading {
                attempt,
                max_attempts,
                estimated_time,
                ..
            } => match estimated_time {
                Some(secs) => format!(
                    "Model is loading, attempt {attempt}/{max_attempts} (~{secs:.0}s remaining)"
                ),
                None => format!("Model is loading, attempt {attempt}/{max_attempts}"),
            },
            FetchProgress::ImageReady { image, total } => {
                format!("Image {}/{total} ready", image + 1)
            }
        }
    }
}
