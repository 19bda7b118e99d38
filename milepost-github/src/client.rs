//! GitHub REST client for one repository

use std::time::Duration;

use milepost_core::config::{ApiConfig, DEFAULT_API_URL};
use milepost_core::{RepositorySlug, Token};
use octocrab::Octocrab;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::{Error, Result};

/// Media type for the v3 REST API
pub const GITHUB_V3_ACCEPT: &str = "application/vnd.github.v3+json";

/// GitHub API client bound to a single repository
///
/// Every request carries the bearer token; there is no session state beyond
/// that.
pub struct GitHubClient {
    http: reqwest::Client,
    repository: RepositorySlug,
    base_url: String,
    token: Token,
}

impl GitHubClient {
    /// Create a client for `repository` against the public GitHub API
    pub fn new(repository: RepositorySlug, token: Token) -> Result<Self> {
        Self::with_api(repository, token, &ApiConfig::default())
    }

    /// Create a client with explicit API settings (base URL, timeout, user agent)
    pub fn with_api(repository: RepositorySlug, token: Token, api: &ApiConfig) -> Result<Self> {
        let parsed = url::Url::parse(&api.base_url).map_err(|e| {
            Error::Parse(format!("Invalid API base URL '{}': {}", api.base_url, e))
        })?;
        let base_url = parsed.as_str().trim_end_matches('/').to_string();
        let http = build_http_client(&token, &api.user_agent, api.timeout)?;

        info!(repository = %repository, base_url = %base_url, "Created GitHub client");

        Ok(Self {
            http,
            repository,
            base_url,
            token,
        })
    }

    /// Create a client from a repository reference such as `owner/repo`
    pub fn from_url(url: &str, token: Token) -> Result<Self> {
        let repository = RepositorySlug::parse(url)?;
        Self::new(repository, token)
    }

    /// Get the repository owner
    pub fn owner(&self) -> &str {
        &self.repository.owner
    }

    /// Get the repository name
    pub fn repo(&self) -> &str {
        &self.repository.name
    }

    /// Get the repository identity
    pub fn repository(&self) -> &RepositorySlug {
        &self.repository
    }

    /// URL of a path below `/repos/{owner}/{repo}`
    pub(crate) fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.base_url, self.repository.owner, self.repository.name, path
        )
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Verify the token can read the repository
    pub async fn check_access(&self) -> Result<()> {
        debug!(repository = %self.repository, "Testing GitHub connection");

        let mut builder = Octocrab::builder().personal_token(self.token.expose().to_string());
        if self.base_url != DEFAULT_API_URL {
            builder = builder.base_uri(self.base_url.as_str())?;
        }
        let client = builder
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        client
            .repos(self.owner(), self.repo())
            .get()
            .await
            .map_err(|e| match e {
                octocrab::Error::GitHub { source, .. } => {
                    if source.message.contains("Not Found") {
                        Error::Other(format!(
                            "Repository {} not found or not accessible",
                            self.repository
                        ))
                    } else if source.message.contains("Bad credentials") {
                        Error::Auth("Invalid GitHub token".to_string())
                    } else {
                        Error::Other(format!("GitHub API error: {}", source.message))
                    }
                }
                other => Error::Api(other),
            })?;

        info!("GitHub connection successful");
        Ok(())
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("repository", &self.repository)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn build_http_client(token: &Token, user_agent: &str, timeout: Duration) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_V3_ACCEPT));

    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
        .map_err(|_| Error::Auth("GitHub token contains invalid characters".to_string()))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    let agent = HeaderValue::from_str(user_agent)
        .map_err(|_| Error::Parse(format!("Invalid user agent: {}", user_agent)))?;
    headers.insert(USER_AGENT, agent);

    Ok(reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()?)
}

/// Pass the response through if it has the expected status, otherwise turn it
/// into [`Error::Request`] carrying the body text
pub(crate) async fn expect_status(response: Response, expected: StatusCode) -> Result<Response> {
    let status = response.status();
    if status == expected {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response".to_string());
    debug!(status = status.as_u16(), body = %body, "GitHub request rejected");

    Err(Error::Request {
        status: status.as_u16(),
        body,
    })
}

/// Decode a JSON response body
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let text = response.text().await?;
    serde_json::from_str(&text)
        .map_err(|e| Error::Parse(format!("Failed to parse GitHub response: {}", e)))
}
