//! Saving a finished gallery and emitting the manifest.

use prism_core::{ExportFormat, ExportRecord, Gallery, OutputFormat, OutputWriter};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Export every image into `dir` and describe each outcome.
///
/// With no directory, records describe the generated images only.
pub(crate) fn export_records(
    gallery: &Gallery,
    format: ExportFormat,
    dir: Option<&Path>,
) -> Vec<ExportRecord> {
    let Some(dir) = dir else {
        return gallery.cards().iter().map(ExportRecord::from_card).collect();
    };

    gallery
        .cards()
        .iter()
        .zip(gallery.export_all(format))
        .map(|(card, outcome)| {
            let written = outcome.and_then(|exported| {
                let path = exported.write_to_dir(dir)?;
                Ok((exported, path))
            });
            match written {
                Ok((exported, path)) => ExportRecord::saved(card, &exported, &path),
                Err(e) => ExportRecord::failed(card, &e),
            }
        })
        .collect()
}

/// Re-encode and write on the blocking pool.
pub async fn export_gallery(
    gallery: Gallery,
    format: ExportFormat,
    dir: Option<PathBuf>,
) -> anyhow::Result<Vec<ExportRecord>> {
    let records =
        tokio::task::spawn_blocking(move || export_records(&gallery, format, dir.as_deref()))
            .await?;
    Ok(records)
}

/// Write the manifest for a batch.
pub fn write_manifest<W: Write>(
    writer: W,
    records: &[ExportRecord],
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<()> {
    let mut writer = OutputWriter::new(writer, format, pretty);
    writer.write_all(records)?;
    writer.flush()?;
    Ok(())
}

/// Log a one-line summary of the export.
pub fn log_summary(records: &[ExportRecord], dir: Option<&Path>) {
    let failed = records.iter().filter(|r| r.is_error()).count();
    match dir {
        Some(dir) if failed == 0 => {
            tracing::info!("Saved {} image(s) to {}", records.len(), dir.display())
        }
        Some(dir) => tracing::warn!(
            "Saved {}/{} image(s) to {}; {failed} failed",
            records.len() - failed,
            records.len(),
            dir.display()
        ),
        None => tracing::info!("Generated {} image(s); export skipped", records.len()),
    }
}
