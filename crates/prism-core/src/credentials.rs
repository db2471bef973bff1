//! API token loading from a `key=value` env file.
//!
//! The token is resolved once and handed to the fetcher explicitly; nothing
//! here is global state.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::ConfigError;

/// Parsed contents of a line-oriented `key=value` file.
#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    vars: HashMap<String, String>,
}

impl EnvFile {
    /// Parse env file text.
    ///
    /// Blank lines and `#` comments are skipped. The first `=` splits key from
    /// value and both sides are trimmed. Lines without `=` are ignored; a
    /// repeated key keeps its last value.
    pub fn parse(text: &str) -> Self {
        let mut vars = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                if key.is_empty() {
                    continue;
                }
                vars.insert(key.to_string(), value.trim().to_string());
            }
        }
        Self { vars }
    }

    /// Read and parse an env file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Number of parsed entries.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// A bearer token for the inference API. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
}

impl Credential {
    /// Wrap a token. Returns `None` for an empty or whitespace-only token.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            None
        } else {
            Some(Self { token })
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tail: String = self
            .token
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        write!(f, "Credential(***{tail})")
    }
}

/// Resolve the API token from the configured env file, falling back to the
/// process environment variable of the same name.
///
/// Returns `Ok(None)` when no token is configured anywhere; the fetcher turns
/// that into a `MissingCredential` error before any request goes out.
pub fn resolve_credential(
    env_file: &Path,
    token_key: &str,
) -> Result<Option<Credential>, ConfigError> {
    if env_file.exists() {
        let vars = EnvFile::load(env_file)?;
        tracing::debug!("Loaded {} entries from {:?}", vars.len(), env_file);
        if let Some(token) = vars.get(token_key).and_then(Credential::new) {
            return Ok(Some(token));
        }
        tracing::debug!("{token_key} not set in {:?}", env_file);
    } else {
        tracing::warn!("Env file {:?} not found", env_file);
    }

    Ok(std::env::var(token_key)
        .ok()
        .and_then(Credential::new))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let env = EnvFile::parse("# comment\n\nHUGGINGFACE_API_TOKEN=hf_abc\n#OTHER=1\n");
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("HUGGINGFACE_API_TOKEN"), Some("hf_abc"));
        assert_eq!(env.get("OTHER"), None);
    }

    #[test]
    fn test_parse_splits_on_first_equals_and_trims() {
        let env = EnvFile::parse("  KEY =  a=b=c  \r\nNOEQUALS\n");
        assert_eq!(env.get("KEY"), Some("a=b=c"));
        assert_eq!(env.get("NOEQUALS"), None);
    }

    #[test]
    fn test_parse_last_duplicate_wins() {
        let env = EnvFile::parse("TOKEN=first\nTOKEN=second\n");
        assert_eq!(env.get("TOKEN"), Some("second"));
    }

    #[test]
    fn test_parse_ignores_empty_key() {
        let env = EnvFile::parse("=value\n");
        assert!(env.is_empty());
    }

    #[test]
    fn test_credential_rejects_blank_token() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("   ").is_none());
        assert_eq!(Credential::new(" hf_x ").unwrap().token(), "hf_x");
    }

    #[test]
    fn test_credential_debug_redacts_token() {
        let cred = Credential::new("hf_supersecret1234").unwrap();
        let shown = format!("{cred:?}");
        assert!(!shown.contains("supersecret"));
        assert!(shown.ends_with("1234)"));
        assert_eq!(cred.bearer(), "Bearer hf_supersecret1234");
    }

    #[test]
    fn test_resolve_from_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "PRISM_TEST_TOKEN_A=hf_from_file\n").unwrap();
        let cred = resolve_credential(&path, "PRISM_TEST_TOKEN_A")
            .unwrap()
            .unwrap();
        assert_eq!(cred.token(), "hf_from_file");
    }

    #[test]
    fn test_resolve_missing_everywhere_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "# no token here\nPRISM_TEST_TOKEN_B=\n").unwrap();
        assert!(resolve_credential(&path, "PRISM_TEST_TOKEN_B")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_resolve_without_env_file_is_none_when_unset() {
        let result = resolve_credential(
            Path::new("/nonexistent/.env"),
            "PRISM_TEST_TOKEN_DEFINITELY_UNSET",
        )
        .unwrap();
        assert!(result.is_none());
    }
}
