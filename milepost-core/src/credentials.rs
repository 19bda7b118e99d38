//! Credential acquisition for milepost
//!
//! A run needs exactly one bearer token. Where it comes from is chosen by the
//! caller: a command-line argument, an environment variable, a plaintext
//! token file, the secrets file, or an interactive hidden prompt. Every
//! variant implements [`TokenSource`].
//!
//! The secrets file is located at `~/.config/milepost/secrets.toml` and must
//! have restrictive permissions (0600 on Unix).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Default environment variable holding the token
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// A bearer token for the GitHub API
///
/// The value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Build a token from raw input, trimming whitespace
    ///
    /// Returns `None` for empty input.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The raw token value
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// Supplies a bearer token for this run
pub trait TokenSource {
    /// Obtain the token
    fn token(&self) -> Result<Token>;

    /// Human readable description of where the token comes from
    fn describe(&self) -> String;

    /// Clean up after the run
    ///
    /// Only token files flagged for deletion do anything here.
    fn release(&self) -> Result<()> {
        Ok(())
    }
}

/// Token passed directly, e.g. as a positional argument
#[derive(Debug, Clone)]
pub struct ArgumentToken {
    value: String,
}

impl ArgumentToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl TokenSource for ArgumentToken {
    fn token(&self) -> Result<Token> {
        Token::new(&self.value)
            .ok_or_else(|| Error::Credential("GitHub token argument is empty".to_string()))
    }

    fn describe(&self) -> String {
        "command-line argument".to_string()
    }
}

/// Token read from an environment variable
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvToken {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_ENV)
    }
}

impl TokenSource for EnvToken {
    fn token(&self) -> Result<Token> {
        let value = std::env::var(&self.var).map_err(|_| {
            Error::Credential(format!("Environment variable {} is not set", self.var))
        })?;
        debug!(var = %self.var, "Using GitHub token from environment");
        Token::new(value)
            .ok_or_else(|| Error::Credential(format!("Environment variable {} is empty", self.var)))
    }

    fn describe(&self) -> String {
        format!("environment variable {}", self.var)
    }
}

/// Token read from a plaintext file, optionally deleted after use
#[derive(Debug, Clone)]
pub struct FileToken {
    path: PathBuf,
    delete_after_use: bool,
}

impl FileToken {
    pub fn new(path: impl Into<PathBuf>, delete_after_use: bool) -> Self {
        Self {
            path: path.into(),
            delete_after_use,
        }
    }

    /// Path of the token file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenSource for FileToken {
    fn token(&self) -> Result<Token> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::Credential(format!(
                "Error reading token file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        debug!(path = %self.path.display(), "Using GitHub token from file");
        Token::new(contents).ok_or_else(|| {
            Error::Credential(format!("Token file {} is empty", self.path.display()))
        })
    }

    fn describe(&self) -> String {
        format!("token file {}", self.path.display())
    }

    fn release(&self) -> Result<()> {
        if !self.delete_after_use {
            return Ok(());
        }

        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Deleted token file");
                Ok(())
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not delete token file");
                Err(Error::Io(e))
            }
        }
    }
}

/// Token typed in at a hidden prompt
#[derive(Debug, Clone)]
pub struct PromptToken {
    prompt: String,
}

impl PromptToken {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl Default for PromptToken {
    fn default() -> Self {
        Self::new("Enter your GitHub personal access token (with 'repo' scope): ")
    }
}

impl TokenSource for PromptToken {
    fn token(&self) -> Result<Token> {
        let value = rpassword::prompt_password(&self.prompt)?;
        Token::new(value).ok_or_else(|| Error::Credential("GitHub token is required".to_string()))
    }

    fn describe(&self) -> String {
        "interactive prompt".to_string()
    }
}

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// GitHub configuration
    pub github: GitHubSecrets,
}

/// GitHub-related secrets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubSecrets {
    /// GitHub Personal Access Token
    pub token: Option<String>,
}

impl Secrets {
    /// Load secrets from a specific file with permission checking
    pub fn load_from_file(path: &Path) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let metadata = std::fs::metadata(path)?;
            let mode = metadata.permissions().mode();

            // Readable by group or others
            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }

            debug!(path = %path.display(), mode = format!("{:o}", mode & 0o777), "Secrets file permissions OK");
        }

        let contents = std::fs::read_to_string(path)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        if let Some(ref mut token) = secrets.github.token {
            *token = token.trim().to_string();
        }

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/milepost/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("milepost").join("secrets.toml"))
    }

    /// Create a template secrets file
    ///
    /// Creates parent directories if needed and sets secure permissions
    pub fn create_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if path.exists() {
            return Err(Error::Config(format!(
                "Secrets file already exists at {}",
                path.display()
            )));
        }

        let template = r#"# milepost secrets
# This file contains sensitive credentials - do not share or commit to version control
#
# IMPORTANT: This file must have restrictive permissions (chmod 600)

[github]
# GitHub Personal Access Token
# Create at: https://github.com/settings/tokens
# Required permissions: repo (or fine-grained: Issues read/write)
token = ""
"#;

        std::fs::write(path, template)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        warn!(path = %path.display(), "Created secrets template - please edit and add your token");

        Ok(())
    }
}

/// Token read from the `[github]` table of the secrets file
#[derive(Debug, Clone)]
pub struct SecretsFileToken {
    path: Option<PathBuf>,
}

impl SecretsFileToken {
    /// Use the secrets file at the default location
    pub fn new() -> Self {
        Self {
            path: Secrets::default_secrets_path(),
        }
    }

    /// Use a secrets file at a specific location
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }
}

impl Default for SecretsFileToken {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSource for SecretsFileToken {
    fn token(&self) -> Result<Token> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| Error::Credential("Could not determine secrets path".to_string()))?;

        if !path.exists() {
            return Err(Error::Credential(format!(
                "Secrets file {} not found",
                path.display()
            )));
        }

        let secrets = Secrets::load_from_file(path)?;
        debug!("Using GitHub token from secrets file");
        secrets
            .github
            .token
            .and_then(Token::new)
            .ok_or_else(|| {
                Error::Credential(format!("No [github] token in {}", path.display()))
            })
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("secrets file {}", path.display()),
            None => "secrets file".to_string(),
        }
    }
}

/// The credential source chosen for a run
#[derive(Debug, Clone)]
pub enum CredentialSource {
    Argument(ArgumentToken),
    Env(EnvToken),
    File(FileToken),
    Secrets(SecretsFileToken),
    Prompt(PromptToken),
}

impl CredentialSource {
    fn inner(&self) -> &dyn TokenSource {
        match self {
            CredentialSource::Argument(source) => source,
            CredentialSource::Env(source) => source,
            CredentialSource::File(source) => source,
            CredentialSource::Secrets(source) => source,
            CredentialSource::Prompt(source) => source,
        }
    }
}

impl TokenSource for CredentialSource {
    fn token(&self) -> Result<Token> {
        self.inner().token()
    }

    fn describe(&self) -> String {
        self.inner().describe()
    }

    fn release(&self) -> Result<()> {
        self.inner().release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_token_trims_and_rejects_empty() {
        assert_eq!(Token::new("  ghp_abc \n").unwrap().expose(), "ghp_abc");
        assert!(Token::new("   ").is_none());
        assert!(Token::new("").is_none());
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = Token::new("ghp_secret").unwrap();
        assert_eq!(format!("{:?}", token), "Token(***)");
    }

    #[test]
    fn test_argument_token() {
        let source = ArgumentToken::new("ghp_arg");
        assert_eq!(source.token().unwrap().expose(), "ghp_arg");
        assert!(ArgumentToken::new("").token().is_err());
    }

    #[test]
    fn test_env_token() {
        std::env::set_var("MILEPOST_TEST_ENV_TOKEN", " ghp_env ");
        let source = EnvToken::new("MILEPOST_TEST_ENV_TOKEN");
        assert_eq!(source.token().unwrap().expose(), "ghp_env");
        assert!(source.describe().contains("MILEPOST_TEST_ENV_TOKEN"));
    }

    #[test]
    fn test_env_token_missing() {
        let source = EnvToken::new("MILEPOST_TEST_ENV_TOKEN_UNSET");
        let err = source.token().unwrap_err();
        assert!(err.to_string().contains("not set"));
    }

    #[test]
    fn test_file_token_kept_by_default() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "ghp_file").unwrap();

        let source = FileToken::new(file.path(), false);
        assert_eq!(source.token().unwrap().expose(), "ghp_file");
        source.release().unwrap();
        assert!(file.path().exists());
    }

    #[test]
    fn test_file_token_deleted_after_use() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_token.txt");
        std::fs::write(&path, "ghp_file\n").unwrap();

        let source = FileToken::new(&path, true);
        assert_eq!(source.token().unwrap().expose(), "ghp_file");
        source.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_file_token_delete_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileToken::new(dir.path().join("missing.txt"), true);
        assert!(source.token().is_err());
        assert!(source.release().is_err());
    }

    #[test]
    fn test_parse_secrets() {
        let toml = r#"
[github]
token = "ghp_xxxxxxxxxxxx"
"#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(secrets.github.token, Some("ghp_xxxxxxxxxxxx".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_insecure_permissions_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[github]\ntoken = \"test\"").unwrap();

        let perms = std::fs::Permissions::from_mode(0o644);
        std::fs::set_permissions(file.path(), perms).unwrap();

        let result = Secrets::load_from_file(file.path());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("insecure permissions"));
    }

    #[cfg(unix)]
    #[test]
    fn test_secrets_file_token() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[github]\ntoken = \"  ghp_test  \"").unwrap();

        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(file.path(), perms).unwrap();

        let source = SecretsFileToken::at(file.path());
        assert_eq!(source.token().unwrap().expose(), "ghp_test");
    }

    #[cfg(unix)]
    #[test]
    fn test_create_template_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("secrets.toml");
        Secrets::create_template(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        // Template has an empty token, which counts as missing
        assert!(SecretsFileToken::at(&path).token().is_err());
        assert!(Secrets::create_template(&path).is_err());
    }

    #[test]
    fn test_credential_source_dispatch() {
        let source = CredentialSource::Argument(ArgumentToken::new("ghp_dispatch"));
        assert_eq!(source.token().unwrap().expose(), "ghp_dispatch");
        assert_eq!(source.describe(), "command-line argument");
        assert!(source.release().is_ok());
    }
}
