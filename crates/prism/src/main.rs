//! Prism CLI - generate images from text prompts with hosted inference models.
//!
//! Prism sends a prompt to a Hugging Face text-to-image model, waits out
//! model cold starts, and saves the results as PNG, JPEG or WebP.
//!
//! # Usage
//!
//! ```bash
//! # Generate two images with the default model
//! prism generate "a lighthouse at dusk" -n 2
//!
//! # Pick a model and format, write JSONL manifest
//! prism generate "koi pond, ink wash" -m runwayml/stable-diffusion-v1-5 -f webp --manifest jsonl
//!
//! # View configuration
//! prism config show
//!
//! # Guided mode
//! prism
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

mod cli;
mod logging;

/// Prism - generate images from text prompts.
#[derive(Parser, Debug)]
#[command(name = "prism")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "PRISM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate images from a text prompt
    Generate(cli::generate::GenerateArgs),

    /// List the models prism can use
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(prism_core::Config::default_path);

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match cli::load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `prism config path`."
            );
            prism_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Prism v{}", prism_core::VERSION);

    match cli.command {
        Some(Commands::Generate(args)) => cli::generate::execute(args, &config_path).await,
        Some(Commands::Models(args)) => cli::models::execute(args, &config),
        Some(Commands::Config(args)) => cli::config::execute(args, &config_path),
        None => {
            if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() {
                cli::interactive::run(&config, &config_path).await
            } else {
                Cli::command().print_help()?;
                Ok(())
            }
        }
    }
}
