//! Configuration management for milepost
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (MILEPOST_*)
//! 3. Config file (~/.config/milepost/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::credentials::{
    CredentialSource, EnvToken, FileToken, PromptToken, SecretsFileToken, DEFAULT_TOKEN_ENV,
};
use crate::{Error, RepositorySlug, Result};

/// Default GitHub REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Which repository to operate on
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Repository owner
    pub owner: Option<String>,

    /// Repository name
    pub name: Option<String>,
}

impl RepositoryConfig {
    /// The configured repository, if both parts are known
    pub fn slug(&self) -> Option<RepositorySlug> {
        match (&self.owner, &self.name) {
            (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => {
                Some(RepositorySlug::new(owner, name))
            }
            _ => None,
        }
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST API
    pub base_url: String,

    /// Request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("milepost/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Where the token comes from when no CLI flag says otherwise
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    #[default]
    Env,
    File,
    Secrets,
    Prompt,
}

/// Credential settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Which source to use
    pub source: CredentialKind,

    /// Environment variable for the `env` source
    pub env_var: String,

    /// Token file for the `file` source
    pub file: Option<PathBuf>,

    /// Delete the token file once the run finishes
    pub delete_file_after_use: bool,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            source: CredentialKind::Env,
            env_var: DEFAULT_TOKEN_ENV.to_string(),
            file: None,
            delete_file_after_use: false,
        }
    }
}

impl CredentialsConfig {
    /// Build the credential source described by this configuration
    pub fn to_source(&self) -> Result<CredentialSource> {
        Ok(match self.source {
            CredentialKind::Env => CredentialSource::Env(EnvToken::new(&self.env_var)),
            CredentialKind::File => {
                let path = self.file.clone().ok_or_else(|| {
                    Error::Config("credentials.source = \"file\" requires credentials.file".to_string())
                })?;
                CredentialSource::File(FileToken::new(path, self.delete_file_after_use))
            }
            CredentialKind::Secrets => CredentialSource::Secrets(SecretsFileToken::new()),
            CredentialKind::Prompt => CredentialSource::Prompt(PromptToken::default()),
        })
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Target repository
    pub repository: RepositoryConfig,

    /// HTTP client settings
    pub api: ApiConfig,

    /// Credential settings
    pub credentials: CredentialsConfig,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub repository: Option<RepositorySlug>,
    pub owner: Option<String>,
    pub name: Option<String>,
    pub api_url: Option<String>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/milepost/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("milepost").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - MILEPOST_OWNER: Repository owner
    /// - MILEPOST_REPO: Repository name, or a full owner/repo reference
    /// - MILEPOST_API_URL: Base URL of the REST API
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(owner) = lookup("MILEPOST_OWNER") {
            self.repository.owner = Some(owner);
        }

        if let Some(repo) = lookup("MILEPOST_REPO") {
            match RepositorySlug::parse(&repo) {
                Ok(slug) => {
                    self.repository.owner = Some(slug.owner);
                    self.repository.name = Some(slug.name);
                }
                Err(_) => self.repository.name = Some(repo),
            }
        }

        if let Some(url) = lookup("MILEPOST_API_URL") {
            self.api.base_url = url;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(slug) = overrides.repository {
            self.repository.owner = Some(slug.owner);
            self.repository.name = Some(slug.name);
        }

        if let Some(owner) = overrides.owner {
            self.repository.owner = Some(owner);
        }

        if let Some(name) = overrides.name {
            self.repository.name = Some(name);
        }

        if let Some(url) = overrides.api_url {
            self.api.base_url = url;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let base = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };
        Ok(base.with_env_overrides().with_cli_overrides(overrides))
    }
}
