//! Per-run setup: configuration, repository, credentials and client

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;
use milepost_core::credentials::{ArgumentToken, EnvToken, FileToken, PromptToken};
use milepost_core::{Config, CredentialSource, Overrides, RepositorySlug, Token, TokenSource};
use milepost_github::GitHubClient;

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Repository (owner/repo, HTTPS or SSH URL)
    #[arg(short = 'R', long = "repo", global = true)]
    pub repo: Option<String>,

    /// Repository owner (overrides --repo)
    #[arg(long, global = true)]
    pub owner: Option<String>,

    /// Repository name (overrides --repo)
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Base URL of the GitHub REST API
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Path to a config file (default: ~/.config/milepost/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// GitHub token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Read the token from this environment variable
    #[arg(long, global = true, value_name = "VAR")]
    pub token_env: Option<String>,

    /// Read the token from this file
    #[arg(long, global = true, value_name = "PATH")]
    pub token_file: Option<PathBuf>,

    /// Delete the token file after the run
    #[arg(long, global = true, requires = "token_file")]
    pub delete_token_file: bool,

    /// Ask for the token at a hidden prompt
    #[arg(long, global = true)]
    pub prompt_token: bool,
}

/// Optional trailing token, an alias for `--token`
#[derive(Args, Debug, Clone, Default)]
pub struct TokenArg {
    /// GitHub token (same as --token)
    #[arg(id = "positional_token", value_name = "TOKEN")]
    pub token: Option<String>,
}

impl GlobalArgs {
    /// Use `positional` as the token unless `--token` was given
    pub fn with_positional_token(mut self, positional: Option<&str>) -> Self {
        if self.token.is_none() {
            self.token = positional.map(str::to_string);
        }
        self
    }

    fn overrides(&self) -> anyhow::Result<Overrides> {
        let repository = self
            .repo
            .as_deref()
            .map(RepositorySlug::parse)
            .transpose()?;

        Ok(Overrides {
            repository,
            owner: self.owner.clone(),
            name: self.name.clone(),
            api_url: self.api_url.clone(),
        })
    }

    /// The credential source named on the command line, if any
    fn credential_source(&self) -> Option<CredentialSource> {
        if let Some(token) = &self.token {
            return Some(CredentialSource::Argument(ArgumentToken::new(token)));
        }
        if let Some(path) = &self.token_file {
            return Some(CredentialSource::File(FileToken::new(
                path,
                self.delete_token_file,
            )));
        }
        if let Some(var) = &self.token_env {
            return Some(CredentialSource::Env(EnvToken::new(var)));
        }
        if self.prompt_token {
            return Some(CredentialSource::Prompt(PromptToken::default()));
        }
        None
    }

    /// Load configuration with CLI overrides applied
    pub fn load_config(&self) -> anyhow::Result<Config> {
        Ok(Config::load_with_overrides(
            self.config.as_deref(),
            self.overrides()?,
        )?)
    }
}

/// Everything a command needs to talk to GitHub
pub struct Session {
    pub client: GitHubClient,
    pub credentials: CredentialSource,
}

impl Session {
    /// Resolve repository and token, and build the client
    pub fn open(global: &GlobalArgs, verbose: bool) -> anyhow::Result<Self> {
        let config = global.load_config()?;
        let repository = resolve_repository(&config)?;

        let (credentials, token) = resolve_token(global, &config)?;

        if verbose {
            tracing::info!(
                repository = %repository,
                credentials = %credentials.describe(),
                base_url = %config.api.base_url,
                "Session ready"
            );
        }

        let client = match GitHubClient::with_api(repository, token, &config.api) {
            Ok(client) => client,
            Err(e) => {
                release(&credentials);
                return Err(e.into());
            }
        };

        Ok(Self {
            client,
            credentials,
        })
    }

    /// Release credentials; failures are reported but never fatal
    pub fn finish(&self) {
        release(&self.credentials);
    }
}

fn release(credentials: &CredentialSource) {
    let CredentialSource::File(file) = credentials else {
        return;
    };

    match credentials.release() {
        Ok(()) if !file.path().exists() => {
            println!(
                "\nToken file '{}' has been deleted for security.",
                file.path().display()
            );
        }
        Ok(()) => {}
        Err(e) => println!("\nWarning: Could not delete token file: {}", e),
    }
}

fn resolve_repository(config: &Config) -> anyhow::Result<RepositorySlug> {
    if let Some(slug) = config.repository.slug() {
        return Ok(slug);
    }

    if let Ok(cwd) = std::env::current_dir() {
        match milepost_core::git::detect_repository(&cwd) {
            Ok(Some(slug)) => {
                tracing::debug!(repository = %slug, "Using repository from git remote");
                return Ok(slug);
            }
            Ok(None) => {}
            Err(e) => tracing::debug!(error = %e, "Could not detect repository from git"),
        }
    }

    if !io::stdin().is_terminal() {
        bail!("No repository specified. Use --repo owner/repo or run from a git repository");
    }

    let owner = ask_with_default(
        "Enter GitHub repository owner",
        config.repository.owner.as_deref(),
    )?;
    let name = ask_with_default(
        "Enter GitHub repository name",
        config.repository.name.as_deref(),
    )?;

    if owner.is_empty() || name.is_empty() {
        bail!("Repository owner and name are required");
    }

    Ok(RepositorySlug::new(owner, name))
}

fn resolve_token(
    global: &GlobalArgs,
    config: &Config,
) -> anyhow::Result<(CredentialSource, Token)> {
    if let Some(source) = global.credential_source() {
        let token = source
            .token()
            .with_context(|| format!("GitHub token is required ({})", source.describe()))?;
        return Ok((source, token));
    }

    let source = config.credentials.to_source()?;
    match source.token() {
        Ok(token) => Ok((source, token)),
        Err(e) if io::stdin().is_terminal() => {
            tracing::debug!(error = %e, "Configured token source unavailable, prompting");
            let prompt = CredentialSource::Prompt(PromptToken::default());
            let token = prompt.token().context("GitHub token is required")?;
            Ok((prompt, token))
        }
        Err(e) => Err(e).context("GitHub token is required"),
    }
}

/// Print `question` and read one trimmed line from stdin
pub fn ask(question: &str) -> io::Result<String> {
    print!("{}", question);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Like [`ask`], returning `default` for an empty answer
pub fn ask_with_default(question: &str, default: Option<&str>) -> io::Result<String> {
    let answer = match default {
        Some(default) => ask(&format!("{} (default: {}): ", question, default))?,
        None => ask(&format!("{}: ", question))?,
    };

    Ok(match (answer.is_empty(), default) {
        (true, Some(default)) => default.to_string(),
        _ => answer,
    })
}
