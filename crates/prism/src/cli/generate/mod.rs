//! The `prism generate` command.

mod export;
mod setup;
pub mod types;

pub use setup::build_session;
pub use types::{ImageFormat, ManifestFormat};

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use prism_core::{CancelToken, ExportFormat, OutputFormat as CoreOutputFormat, Session, SubmitInput};
use std::path::{Path, PathBuf};
use std::time::Duration;

use export::{export_gallery, log_summary, write_manifest};
use setup::setup_generate;

/// Arguments for the `generate` command.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Text prompt describing the image(s)
    #[arg(required = true, num_args = 1..)]
    pub prompt: Vec<String>,

    /// Model to use (must be in the allowed list, see `prism models list`)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Number of images to generate
    #[arg(short = 'n', long)]
    pub count: Option<u32>,

    /// Download format for saved images
    #[arg(short, long, value_enum)]
    pub format: Option<ImageFormat>,

    /// Directory to save images into
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Filename prefix for saved images
    #[arg(long)]
    pub prefix: Option<String>,

    /// Env file holding the API token
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Attempts per image while the model is loading
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Delay between attempts, in milliseconds
    #[arg(long)]
    pub backoff_ms: Option<u64>,

    /// Manifest format written to stdout
    #[arg(long, value_enum)]
    pub manifest: Option<ManifestFormat>,

    /// Generate only; do not save any files
    #[arg(long)]
    pub no_export: bool,
}

impl GenerateArgs {
    /// Prompt words joined back into one string.
    pub fn prompt_text(&self) -> String {
        self.prompt.join(" ")
    }
}

/// Everything assembled by `setup_generate()`.
pub(crate) struct GenerateContext {
    pub session: Session,
    pub input: SubmitInput,
    pub export_format: ExportFormat,
    /// `None` with `--no-export`
    pub output_dir: Option<PathBuf>,
    pub manifest_format: CoreOutputFormat,
    pub pretty: bool,
}

/// Execute the generate command.
pub async fn execute(args: GenerateArgs, config_path: &Path) -> anyhow::Result<()> {
    let GenerateContext {
        mut session,
        input,
        export_format,
        output_dir,
        manifest_format,
        pretty,
    } = setup_generate(&args, config_path)?;

    tracing::info!("Generating {} image(s) with {}", input.count, input.model);

    let gallery = run_with_spinner(&mut session, &input).await?;
    let records = export_gallery(gallery, export_format, output_dir.clone()).await?;
    log_summary(&records, output_dir.as_deref());

    write_manifest(std::io::stdout().lock(), &records, manifest_format, pretty)
}

/// Submit one batch with a spinner; Ctrl+C cancels it.
pub async fn run_with_spinner(
    session: &mut Session,
    input: &SubmitInput,
) -> anyhow::Result<prism_core::Gallery> {
    let cancel = CancelToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let spinner = create_spinner();
    let failure = session
        .submit(input, &cancel, |progress| {
            spinner.set_message(progress.status_text())
        })
        .await
        .error_message()
        .map(str::to_string);
    spinner.finish_and_clear();
    interrupt.abort();

    if let Some(message) = failure {
        anyhow::bail!(message);
    }
    session
        .take_gallery()
        .ok_or_else(|| anyhow::anyhow!("Generation finished without results"))
}

fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} [{elapsed}] {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Generating images...");
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
