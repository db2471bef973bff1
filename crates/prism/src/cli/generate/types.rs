//! CLI enum types for the generate command: image format, manifest format.

use clap::ValueEnum;
use prism_core::{ExportFormat, OutputFormat as CoreOutputFormat};

/// Download format for generated images.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    /// JPEG (alpha is dropped)
    #[value(alias = "jpeg")]
    Jpg,
    Webp,
}

impl From<ImageFormat> for ExportFormat {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Png => ExportFormat::Png,
            ImageFormat::Jpg => ExportFormat::Jpg,
            ImageFormat::Webp => ExportFormat::Webp,
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", ExportFormat::from(*self))
    }
}

/// Manifest formats written to stdout.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum ManifestFormat {
    /// Single JSON array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<ManifestFormat> for CoreOutputFormat {
    fn from(format: ManifestFormat) -> Self {
        match format {
            ManifestFormat::Json => CoreOutputFormat::Json,
            ManifestFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

impl std::fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestFormat::Json => write!(f, "json"),
            ManifestFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}
