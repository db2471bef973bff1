//! Text-to-image inference with retry orchestration.
//!
//! A backend abstraction over the remote API, a single-step response
//! classifier, a fixed-delay retry policy, and the sequential fetcher that
//! ties them together.

pub(crate) mod cancel;
pub(crate) mod classify;
pub(crate) mod client;
pub(crate) mod fetcher;
pub(crate) mod retry;

pub use cancel::CancelToken;
pub use classify::{classify, is_loading_message, MODEL_LOADING_MARKER};
pub use client::{HttpBackend, InferenceBackend, RawResponse};
pub use fetcher::Fetcher;
pub use retry::RetryPolicy;
