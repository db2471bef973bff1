//! Interactive CLI mode: guided experience for bare `prism` invocation.
//!
//! When `prism` runs with no subcommand on a TTY, this module offers a menu
//! that drives the same session and export code as `prism generate`.

pub mod generate;
pub mod theme;

use std::path::Path;

use console::Style;
use dialoguer::Select;
use prism_core::Config;

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

const MENU_ITEMS: &[&str] = &["Generate images", "List models", "Show configuration", "Exit"];

/// Entry point for interactive mode.
pub async fn run(config: &Config, config_path: &Path) -> anyhow::Result<()> {
    theme::print_banner();

    let theme = theme::prism_theme();

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => generate::guided_generate(config).await?,
            Some(1) => show_models(config),
            Some(2) => show_config(config, config_path),
            _ => break, // Exit or Esc / Ctrl+C
        }
    }

    Ok(())
}

fn show_models(config: &Config) {
    let dim = Style::new().for_stderr().dim();
    eprintln!();
    for (model, is_default) in crate::cli::models::model_rows(&config.inference) {
        if is_default {
            eprintln!("    {model} {}", dim.apply_to("(default)"));
        } else {
            eprintln!("    {model}");
        }
    }
    eprintln!();
}

/// Label and value rows describing the settings that shape a generation run.
fn config_summary(config: &Config, config_path: &Path) -> Vec<(&'static str, String)> {
    let path_note = if config_path.exists() {
        "(exists)"
    } else {
        "(using defaults)"
    };
    let env_file = config.env_file();
    let env_note = if env_file.exists() {
        "(found)"
    } else {
        "(missing)"
    };

    vec![
        (
            "Config file:",
            format!("{} {path_note}", config_path.display()),
        ),
        ("Endpoint:", config.inference.endpoint.clone()),
        ("Default model:", config.inference.default_model.clone()),
        (
            "Retry:",
            format!(
                "{} attempt(s), {} ms apart",
                config.retry.max_attempts, config.retry.backoff_ms
            ),
        ),
        ("Env file:", format!("{} {env_note}", env_file.display())),
        (
            "Export:",
            format!(
                "{} into {}",
                config.export.format,
                config.output_dir().display()
            ),
        ),
    ]
}

/// Print a summary of the settings that shape a generation run.
fn show_config(config: &Config, config_path: &Path) {
    let cyan = Style::new().for_stderr().cyan();
    let label = Style::new().for_stderr().bold();

    eprintln!();
    eprintln!("  {}", cyan.apply_to("Current configuration:"));
    eprintln!();
    for (name, value) in config_summary(config, config_path) {
        eprintln!("    {:<18} {value}", label.apply_to(name));
    }
    eprintln!();
}
