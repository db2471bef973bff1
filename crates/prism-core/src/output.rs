//! Batch manifest output in JSON or JSON Lines.
//!
//! After a batch is exported, one `ExportRecord` per image describes where
//! it went (or why it did not), so scripts can consume `prism generate`
//! output without scraping logs.

use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::present::{ExportedImage, ImageCard};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Manifest entry for one generated image.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRecord {
    pub id: String,
    pub index: usize,
    pub prompt: String,
    pub model: String,
    pub content_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Saved file, when the export succeeded and was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<usize>,
    /// Per-image export failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportRecord {
    /// Record for a card that was not exported.
    pub fn from_card(card: &ImageCard) -> Self {
        Self {
            id: card.id.clone(),
            index: card.index,
            prompt: card.caption.clone(),
            model: card.model.clone(),
            content_hash: card.content_hash.clone(),
            width: card.width,
            height: card.height,
            path: None,
            mime_type: None,
            size_bytes: None,
            error: None,
        }
    }

    /// Record for a card whose export was written to `path`.
    pub fn saved(card: &ImageCard, exported: &ExportedImage, path: &Path) -> Self {
        Self {
            width: Some(exported.width),
            height: Some(exported.height),
            path: Some(path.to_path_buf()),
            mime_type: Some(exported.mime_type().to_string()),
            size_bytes: Some(exported.bytes.len()),
            ..Self::from_card(card)
        }
    }

    /// Record for a card whose export failed.
    pub fn failed(card: &ImageCard, error: &ExportError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::from_card(card)
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A writer that serializes records to JSON or JSONL.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// `pretty` only affects JSON; JSONL is always one object per line.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write one line of JSONL, or one standalone JSON value.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        if self.pretty && self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)?;
        self.items_written += 1;
        Ok(())
    }

    /// Write a whole batch: a JSON array, or one line per item for JSONL.
    pub fn write_all<T: Serialize>(&mut self, items: &[T]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, items)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, items).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
                self.items_written += items.len();
            }
            OutputFormat::JsonLines => {
                for item in items {
                    self.write(item)?;
                }
            }
        }
        Ok(())
    }

    pub fn items_written(&self) -> usize {
        self.items_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
