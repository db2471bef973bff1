//! Guided generation flow.
//!
//! prompt → model → count → generate → per image: format, filename, save.

use console::Style;
use dialoguer::{Input, Select};
use prism_core::{Config, ConfigError, ExportFormat, Gallery, ImageCard, SubmitInput};

use super::handle_interrupt;
use super::theme::prism_theme;
use crate::cli::generate::{build_session, run_with_spinner};

/// Walk the user through one batch and save the images they keep.
pub async fn guided_generate(config: &Config) -> anyhow::Result<()> {
    let theme = prism_theme();
    let warn = Style::new().for_stderr().yellow();
    let err = Style::new().for_stderr().red();

    let mut session = build_session(config)?;
    if !session.has_credential() {
        let missing = ConfigError::MissingCredential {
            key: config.credentials.token_key.clone(),
        };
        eprintln!("  {}", warn.apply_to(missing));
        return Ok(());
    }

    let Some(prompt) = handle_interrupt(
        Input::<String>::with_theme(&theme)
            .with_prompt("Describe the image")
            .interact_text(),
    )?
    else {
        return Ok(());
    };

    let models = config.inference.allowed_models.as_slice();
    let Some(model_index) = Select::with_theme(&theme)
        .with_prompt("Model")
        .items(models)
        .default(default_model_index(config))
        .interact_opt()?
    else {
        return Ok(());
    };

    let max = config.generation.max_count;
    let Some(count) = handle_interrupt(
        Input::<u32>::with_theme(&theme)
            .with_prompt(format!("Number of images (1-{max})"))
            .default(config.generation.default_count)
            .validate_with(move |n: &u32| -> Result<(), String> {
                if (1..=max).contains(n) {
                    Ok(())
                } else {
                    Err(format!("Number of images must be between 1 and {max}."))
                }
            })
            .interact_text(),
    )?
    else {
        return Ok(());
    };

    let input = SubmitInput {
        prompt,
        model: models[model_index].clone(),
        count,
    };

    let gallery = match run_with_spinner(&mut session, &input).await {
        Ok(gallery) => gallery,
        Err(e) => {
            eprintln!("  {} {e}", err.apply_to("✗"));
            return Ok(());
        }
    };

    save_interactively(config, &gallery)
}

/// Ask for a format and filename per image, then write it.
fn save_interactively(config: &Config, gallery: &Gallery) -> anyhow::Result<()> {
    let theme = prism_theme();
    let ok = Style::new().for_stderr().green();
    let err = Style::new().for_stderr().red();
    let dim = Style::new().for_stderr().dim();
    let output_dir = config.output_dir();

    let mut choices: Vec<String> = ExportFormat::ALL
        .iter()
        .map(|f| f.extension().to_uppercase())
        .collect();
    choices.push("Skip".to_string());

    for card in gallery.cards() {
        eprintln!();
        eprintln!("  {}", describe_card(card));
        eprintln!("  {}", dim.apply_to(card.content_hash.get(..16).unwrap_or_default()));

        let Some(choice) = Select::with_theme(&theme)
            .with_prompt("Save as")
            .items(choices.as_slice())
            .default(default_format_index(config))
            .interact_opt()?
        else {
            return Ok(());
        };
        let Some(&format) = ExportFormat::ALL.get(choice) else {
            continue; // Skip
        };

        let Some(stem) = handle_interrupt(
            Input::<String>::with_theme(&theme)
                .with_prompt("Filename")
                .default(card.default_filename.clone())
                .interact_text(),
        )?
        else {
            return Ok(());
        };

        match gallery
            .export(card.index, format, &stem)
            .and_then(|exported| exported.write_to_dir(&output_dir))
        {
            Ok(path) => eprintln!("  {} {}", ok.apply_to("✓"), path.display()),
            Err(e) => eprintln!("  {} {e}", err.apply_to("✗")),
        }
    }

    Ok(())
}

/// Position of the configured default model in the allowed list.
fn default_model_index(config: &Config) -> usize {
    config
        .inference
        .allowed_models
        .iter()
        .position(|m| *m == config.inference.default_model)
        .unwrap_or(0)
}

/// Position of the configured export format in the format menu.
fn default_format_index(config: &Config) -> usize {
    ExportFormat::parse(&config.export.format)
        .and_then(|f| ExportFormat::ALL.iter().position(|x| *x == f))
        .unwrap_or(0)
}

/// One-line description of a card for the terminal.
fn describe_card(card: &ImageCard) -> String {
    let size = match (card.width, card.height) {
        (Some(w), Some(h)) => format!("{w}x{h}, "),
        _ => String::new(),
    };
    format!(
        "#{} \"{}\" ({size}{:.1} KB)",
        card.index + 1,
        card.caption,
        card.size_bytes as f64 / 1024.0
    )
}
