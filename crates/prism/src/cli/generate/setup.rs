//! Generate setup: config overrides, credential lookup, session construction.

use prism_core::{
    resolve_credential, Config, ExportFormat, Fetcher, OutputFormat as CoreOutputFormat, Session,
    SubmitInput,
};
use std::path::{Path, PathBuf};

use super::{GenerateArgs, GenerateContext};

/// Apply command-line overrides on top of the loaded config.
pub(crate) fn apply_overrides(config: &mut Config, args: &GenerateArgs) {
    if let Some(ref model) = args.model {
        config.inference.default_model = model.clone();
        // An explicit -m outside the allow-list is still rejected by the session.
    }
    if let Some(format) = args.format {
        config.export.format = format.to_string();
    }
    if let Some(ref dir) = args.output_dir {
        config.export.output_dir = dir.to_string_lossy().into_owned();
    }
    if let Some(ref prefix) = args.prefix {
        config.export.filename_prefix = prefix.clone();
    }
    if let Some(ref env_file) = args.env_file {
        config.credentials.env_file = env_file.to_string_lossy().into_owned();
    }
    if let Some(max_attempts) = args.max_attempts {
        config.retry.max_attempts = max_attempts;
    }
    if let Some(backoff_ms) = args.backoff_ms {
        config.retry.backoff_ms = backoff_ms;
    }
    if let Some(manifest) = args.manifest {
        config.output.format = manifest.to_string();
    }
}

/// Resolve the credential and build a session from a validated config.
pub fn build_session(config: &Config) -> anyhow::Result<Session> {
    let credential = resolve_credential(&config.env_file(), &config.credentials.token_key)?;
    if credential.is_none() {
        tracing::warn!(
            "No {} found in {} or the environment",
            config.credentials.token_key,
            config.env_file().display()
        );
    }
    let fetcher = Fetcher::from_config(config)?;
    tracing::debug!(
        "Using {} backend, up to {} attempt(s) per image",
        fetcher.backend_name(),
        fetcher.policy().max_attempts
    );
    Ok(Session::new(fetcher, credential, config))
}

/// Load config, apply overrides, and assemble everything `execute` needs.
pub fn setup_generate(args: &GenerateArgs, config_path: &Path) -> anyhow::Result<GenerateContext> {
    let mut config = crate::cli::load_config(config_path)?;
    apply_overrides(&mut config, args);
    config.validate()?;

    let input = SubmitInput {
        prompt: args.prompt_text(),
        model: config.inference.default_model.clone(),
        count: args.count.unwrap_or(config.generation.default_count),
    };

    let export_format = ExportFormat::parse(&config.export.format).unwrap_or(ExportFormat::Png);
    let manifest_format =
        CoreOutputFormat::parse(&config.output.format).unwrap_or(CoreOutputFormat::Json);
    let output_dir: Option<PathBuf> = (!args.no_export).then(|| config.output_dir());

    Ok(GenerateContext {
        session: build_session(&config)?,
        input,
        export_format,
        output_dir,
        manifest_format,
        pretty: config.output.pretty,
    })
}

#[cfg(test)]
mod tests {
    use super::super::types::{ImageFormat, ManifestFormat};
    use super::*;

    fn args() -> GenerateArgs {
        GenerateArgs {
            prompt: vec!["a".to_string(), "red".to_string(), "fox".to_string()],
            ..GenerateArgs::default()
        }
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut config = Config::default();
        apply_overrides(&mut config, &args());
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.export.format, "png");
        assert_eq!(config.output.format, "json");
    }

    #[test]
    fn test_overrides_applied() {
        let mut config = Config::default();
        let args = GenerateArgs {
            model: Some("runwayml/stable-diffusion-v1-5".to_string()),
            format: Some(ImageFormat::Jpg),
            output_dir: Some(PathBuf::from("/tmp/out")),
            prefix: Some("fox".to_string()),
            max_attempts: Some(2),
            backoff_ms: Some(50),
            manifest: Some(ManifestFormat::Jsonl),
            ..args()
        };
        apply_overrides(&mut config, &args);

        assert_eq!(config.inference.default_model, "runwayml/stable-diffusion-v1-5");
        assert_eq!(config.export.format, "jpg");
        assert_eq!(config.export.output_dir, "/tmp/out");
        assert_eq!(config.export.filename_prefix, "fox");
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.backoff_ms, 50);
        assert_eq!(config.output.format, "jsonl");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_attempts_fails_validation() {
        let mut config = Config::default();
        let args = GenerateArgs {
            max_attempts: Some(0),
            ..args()
        };
        apply_overrides(&mut config, &args);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_setup_reads_token_from_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join(".env");
        std::fs::write(&env_file, "HUGGINGFACE_API_TOKEN=hf_abc\n").unwrap();

        let args = GenerateArgs {
            env_file: Some(env_file),
            count: Some(3),
            no_export: true,
            ..args()
        };
        let ctx = setup_generate(&args, &dir.path().join("missing.toml")).unwrap();
        assert!(ctx.session.has_credential());
        assert_eq!(ctx.input.prompt, "a red fox");
        assert_eq!(ctx.input.count, 3);
        assert!(ctx.output_dir.is_none());
        assert_eq!(ctx.export_format, ExportFormat::Png);
    }
}
