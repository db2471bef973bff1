//! The `prism models` command.

use clap::{Args, Subcommand};
use console::Style;
use prism_core::config::InferenceConfig;
use prism_core::Config;

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for model listing.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// List the models prism is allowed to call
    List {
        /// Print model ids only, one per line
        #[arg(long)]
        plain: bool,
    },
}

/// Execute the models command.
pub fn execute(args: ModelsArgs, config: &Config) -> anyhow::Result<()> {
    match args.command {
        ModelsCommand::List { plain: true } => {
            for model in &config.inference.allowed_models {
                println!("{model}");
            }
        }
        ModelsCommand::List { plain: false } => {
            let dim = Style::new().dim();
            let green = Style::new().green();
            println!("Models (endpoint: {}):", config.inference.endpoint);
            for (model, is_default) in model_rows(&config.inference) {
                if is_default {
                    println!("  {} {model} {}", green.apply_to("*"), dim.apply_to("(default)"));
                } else {
                    println!("    {model}");
                }
            }
        }
    }
    Ok(())
}

/// Allowed models in config order, flagged when they are the default.
pub fn model_rows(inference: &InferenceConfig) -> Vec<(&str, bool)> {
    inference
        .allowed_models
        .iter()
        .map(|m| (m.as_str(), *m == inference.default_model))
        .collect()
}
