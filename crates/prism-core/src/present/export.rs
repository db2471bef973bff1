//! Re-encoding generated images into a downloadable format.

use image::{DynamicImage, GenericImageView, ImageFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ExportError;
use crate::types::ImageResult;

/// Target format for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpg,
    Webp,
}

impl ExportFormat {
    /// Every format offered for download, in menu order.
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Png, ExportFormat::Jpg, ExportFormat::Webp];

    /// Parse a format token (case-insensitive; "jpeg" is accepted for jpg).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Webp => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpg => ImageFormat::Jpeg,
            Self::Webp => ImageFormat::WebP,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ExportError::UnsupportedFormat(s.to_string()))
    }
}

/// A re-encoded image ready to be saved as `<stem>.<ext>`.
#[derive(Debug, Clone)]
pub struct ExportedImage {
    /// Final filename including extension
    pub filename: String,
    pub format: ExportFormat,
    /// Encoded bytes
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ExportedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Write the file into `dir`, creating the directory if needed.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        tracing::debug!("Wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Make a user-supplied filename stem safe for the local filesystem.
///
/// Path separators, reserved characters and control characters become `_`.
/// A stem that is empty or only dots after cleaning is rejected.
pub fn sanitize_stem(stem: &str) -> Result<String, ExportError> {
    let cleaned: String = stem
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_end_matches('.').to_string();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        return Err(ExportError::InvalidFilename(stem.to_string()));
    }
    Ok(cleaned)
}

/// Decode a generated image and re-encode it as `format`.
///
/// PNG keeps every pixel. JPEG drops alpha and uses the encoder's default
/// quality. WebP goes through the `image` crate's encoder from RGBA8.
pub fn export_as(
    result: &ImageResult,
    format: ExportFormat,
    stem: &str,
) -> Result<ExportedImage, ExportError> {
    let stem = sanitize_stem(stem)?;
    let index = result.index();

    let decoded = image::load_from_memory(result.bytes()).map_err(|e| ExportError::Decode {
        index,
        message: e.to_string(),
    })?;
    let (width, height) = decoded.dimensions();

    let prepared = match format {
        ExportFormat::Png => decoded,
        ExportFormat::Jpg => DynamicImage::ImageRgb8(decoded.to_rgb8()),
        ExportFormat::Webp => DynamicImage::ImageRgba8(decoded.to_rgba8()),
    };

    let mut buffer = Cursor::new(Vec::new());
    prepared
        .write_to(&mut buffer, format.image_format())
        .map_err(|e| ExportError::Encode {
            index,
            format: format.to_string(),
            message: e.to_string(),
        })?;

    Ok(ExportedImage {
        filename: format!("{stem}.{}", format.extension()),
        format,
        bytes: buffer.into_inner(),
        width,
        height,
    })
}
