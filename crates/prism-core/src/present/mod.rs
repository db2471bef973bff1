//! Result presentation: a gallery view-model plus per-image export.
//!
//! `present` is a pure function from results to a description of what to
//! show. Rendering is left to whatever UI sits on top (the CLI prints it;
//! a GUI could draw cards from the same data).

mod export;

pub use export::{export_as, sanitize_stem, ExportFormat, ExportedImage};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Serialize;
use std::io::Cursor;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ExportError;
use crate::types::ImageResult;

/// Inputs to `present` that are not part of the results themselves.
#[derive(Debug, Clone)]
pub struct PresentOptions {
    /// Prefix for default filenames
    pub filename_prefix: String,
    /// Timestamp baked into default filenames (unix millis)
    pub timestamp_ms: u128,
}

impl PresentOptions {
    /// Options stamped with the current time.
    pub fn now(filename_prefix: &str) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self {
            filename_prefix: filename_prefix.to_string(),
            timestamp_ms,
        }
    }
}

/// View-model for one generated image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageCard {
    /// Stable per-batch element id ("generated-image-<index>")
    pub id: String,
    pub index: usize,
    /// Alt text for the preview (the prompt)
    pub alt: String,
    /// Caption under the preview (the prompt)
    pub caption: String,
    pub model: String,
    pub content_type: String,
    pub size_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// BLAKE3 hash of the raw bytes
    pub content_hash: String,
    /// Suggested filename stem for downloads
    pub default_filename: String,
    /// Formats offered for download
    pub formats: Vec<ExportFormat>,
}

/// Ordered set of cards backed by the image bytes they describe.
///
/// Owns the results: dropping the gallery (new batch, reset, teardown)
/// releases every preview buffer.
#[derive(Debug)]
pub struct Gallery {
    results: Vec<ImageResult>,
    cards: Vec<ImageCard>,
}

/// Read image dimensions from the header without a full decode.
fn probe_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

fn build_card(result: &ImageResult, options: &PresentOptions) -> ImageCard {
    let index = result.index();
    let dimensions = probe_dimensions(result.bytes());
    if dimensions.is_none() {
        tracing::warn!("Cannot read dimensions of image {index}; preview may not render");
    }

    ImageCard {
        id: format!("generated-image-{index}"),
        index,
        alt: result.prompt().to_string(),
        caption: result.prompt().to_string(),
        model: result.model().to_string(),
        content_type: result.content_type().to_string(),
        size_bytes: result.bytes().len(),
        width: dimensions.map(|(w, _)| w),
        height: dimensions.map(|(_, h)| h),
        content_hash: blake3::hash(result.bytes()).to_hex().to_string(),
        default_filename: format!(
            "{}-{}-{index}",
            options.filename_prefix, options.timestamp_ms
        ),
        formats: ExportFormat::ALL.to_vec(),
    }
}

/// Build the gallery view-model for a finished batch.
pub fn present(results: Vec<ImageResult>, options: &PresentOptions) -> Gallery {
    let cards = results.iter().map(|r| build_card(r, options)).collect();
    Gallery { results, cards }
}

impl Gallery {
    pub fn cards(&self) -> &[ImageCard] {
        &self.cards
    }

    pub fn results(&self) -> &[ImageResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn card(&self, index: usize) -> Option<&ImageCard> {
        self.cards.get(index)
    }

    /// `data:` URL for showing image `index` inline.
    pub fn preview_data_url(&self, index: usize) -> Option<String> {
        let result = self.results.get(index)?;
        Some(format!(
            "data:{};base64,{}",
            result.content_type(),
            BASE64.encode(result.bytes())
        ))
    }

    /// Export one image under an explicit filename stem.
    pub fn export(
        &self,
        index: usize,
        format: ExportFormat,
        stem: &str,
    ) -> Result<ExportedImage, ExportError> {
        let result = self
            .results
            .get(index)
            .ok_or(ExportError::NoSuchImage(index))?;
        export_as(result, format, stem)
    }

    /// Export every image under its default filename.
    ///
    /// Returns one outcome per card; a failure for one image does not stop
    /// the others.
    pub fn export_all(&self, format: ExportFormat) -> Vec<Result<ExportedImage, ExportError>> {
        self.results
            .iter()
            .zip(&self.cards)
            .map(|(result, card)| {
                let outcome = export_as(result, format, &card.default_filename);
                if let Err(e) = &outcome {
                    tracing::warn!("{}: {e}", card.id);
                }
                outcome
            })
            .collect()
    }
}

impl Drop for Gallery {
    fn drop(&mut self) {
        if !self.results.is_empty() {
            tracing::debug!("Releasing {} preview image(s)", self.results.len());
        }
    }
}
