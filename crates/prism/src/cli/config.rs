//! The `prism config` command for configuration management.

use anyhow::Context;
use clap::{Args, Subcommand};
use prism_core::Config;
use std::path::Path;
use toml_edit::{DocumentMut, Item, Value};

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Set one value, e.g. `prism config set retry.max_attempts 8`
    Set {
        /// Dotted key (section.field)
        key: String,
        /// New value; numbers, booleans and arrays are parsed as TOML
        value: String,
    },
}

/// Execute the config command.
pub fn execute(args: ConfigArgs, path: &Path) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = super::load_config(path)?;
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", path.display());
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }
            write_config(path, &Config::default().to_toml()?)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }

        ConfigCommand::Set { key, value } => {
            let current = if path.exists() {
                std::fs::read_to_string(path)
                    .with_context(|| format!("Cannot read {}", path.display()))?
            } else {
                Config::default().to_toml()?
            };
            let updated = set_value(&current, &key, &value)?;
            write_config(path, &updated)?;
            println!("{key} = {value}");
        }
    }

    Ok(())
}

fn write_config(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

/// Set `key` in the TOML document `source` and return the new text.
///
/// Comments and layout elsewhere in the file are kept. The result must
/// still be a valid prism config.
pub(crate) fn set_value(source: &str, key: &str, raw: &str) -> anyhow::Result<String> {
    let mut doc: DocumentMut = source.parse().context("Config file is not valid TOML")?;

    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.trim().is_empty()) {
        anyhow::bail!("Invalid key '{key}': expected section.field");
    }
    let Some((field, sections)) = parts.split_last() else {
        anyhow::bail!("Invalid key '{key}'");
    };

    let mut table = doc.as_table_mut();
    for section in sections {
        table = table
            .entry(section)
            .or_insert(toml_edit::table())
            .as_table_mut()
            .with_context(|| format!("'{section}' is not a table"))?;
    }
    let mut value = parse_value(raw);
    if let Some(existing) = table.get_mut(field).and_then(Item::as_value_mut) {
        *value.decor_mut() = existing.decor().clone();
    }
    table.insert(field, Item::Value(value));

    let text = doc.to_string();
    Config::from_toml(&text).with_context(|| format!("Rejected {key} = {raw}"))?;
    Ok(text)
}

/// Parse `raw` as a TOML value, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    match raw.parse::<Value>() {
        Ok(mut value) => {
            value.decor_mut().clear();
            value
        }
        Err(_) => Value::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "# my settings\n[retry]\nmax_attempts = 5 # keep low\nbackoff_ms = 2000\n";

    #[test]
    fn set_keeps_comments() {
        let text = set_value(SOURCE, "retry.backoff_ms", "500").unwrap();
        assert!(text.contains("# my settings"));
        assert!(text.contains("# keep low"));
        assert!(text.contains("backoff_ms = 500"));
        assert_eq!(Config::from_toml(&text).unwrap().retry.backoff_ms, 500);
    }

    #[test]
    fn set_keeps_inline_comment_of_replaced_value() {
        let text = set_value(SOURCE, "retry.max_attempts", "3").unwrap();
        assert!(text.contains("# keep low"));
        assert_eq!(Config::from_toml(&text).unwrap().retry.max_attempts, 3);
    }

    #[test]
    fn set_creates_missing_section() {
        let text = set_value(SOURCE, "export.format", "webp").unwrap();
        let config = Config::from_toml(&text).unwrap();
        assert_eq!(config.export.format, "webp");
    }

    #[test]
    fn set_parses_booleans_and_arrays() {
        let text = set_value(SOURCE, "output.pretty", "true").unwrap();
        assert!(Config::from_toml(&text).unwrap().output.pretty);

        let text = set_value(
            SOURCE,
            "inference.allowed_models",
            r#"["stabilityai/stable-diffusion-xl-base-1.0", "org/other"]"#,
        )
        .unwrap();
        let config = Config::from_toml(&text).unwrap();
        assert_eq!(config.inference.allowed_models.len(), 2);
    }

    #[test]
    fn set_rejects_invalid_values() {
        assert!(set_value(SOURCE, "retry.max_attempts", "0").is_err());
        assert!(set_value(SOURCE, "export.format", "gif").is_err());
        assert!(set_value(SOURCE, "retry.", "1").is_err());
        assert!(set_value(SOURCE, "retry.max_attempts.deep", "1").is_err());
    }

    #[test]
    fn execute_set_then_init_guard() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prism").join("config.toml");

        let set = ConfigArgs {
            command: ConfigCommand::Set {
                key: "generation.default_count".into(),
                value: "2".into(),
            },
        };
        execute(set, &path).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.generation.default_count, 2);

        let init = ConfigArgs {
            command: ConfigCommand::Init { force: false },
        };
        assert!(execute(init, &path).is_err());

        let init = ConfigArgs {
            command: ConfigCommand::Init { force: true },
        };
        execute(init, &path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().generation.default_count, 1);
    }
}
