//! Repository identity parsing

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An `owner/name` pair identifying a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySlug {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepositorySlug {
    /// Create a slug from its parts
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse a repository reference
    ///
    /// Supports formats:
    /// - owner/repo
    /// - https://github.com/owner/repo
    /// - git@github.com:owner/repo.git
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();

        if !reference.contains(':') && !reference.contains('/') {
            return Err(Error::Config(format!(
                "Invalid repository format: {}. Expected owner/repo",
                reference
            )));
        }

        if !reference.contains("://") && !reference.contains('@') {
            let parts: Vec<&str> = reference.split('/').collect();
            if let [owner, name] = parts.as_slice() {
                return Self::from_parts(owner, name.trim_end_matches(".git"), reference);
            }
            return Err(Error::Config(format!(
                "Invalid repository format: {}. Expected owner/repo",
                reference
            )));
        }

        if reference.starts_with("https://") || reference.starts_with("http://") {
            let url = url::Url::parse(reference).map_err(|e| Error::Config(e.to_string()))?;
            let path = url
                .path()
                .trim_start_matches('/')
                .trim_end_matches('/')
                .trim_end_matches(".git");
            let mut parts = path.split('/');
            if let (Some(owner), Some(name)) = (parts.next(), parts.next()) {
                return Self::from_parts(owner, name, reference);
            }
            return Err(Error::Config(format!("Invalid GitHub URL path: {}", path)));
        }

        if reference.starts_with("git@") {
            if let Some(path) = reference.split(':').nth(1) {
                let mut parts = path.trim_end_matches(".git").split('/');
                if let (Some(owner), Some(name)) = (parts.next(), parts.next()) {
                    return Self::from_parts(owner, name, reference);
                }
            }
            return Err(Error::Config(format!("Invalid SSH URL: {}", reference)));
        }

        Err(Error::Config(format!("Unrecognized repository format: {}", reference)))
    }

    fn from_parts(owner: &str, name: &str, input: &str) -> Result<Self> {
        if owner.is_empty() || name.is_empty() {
            return Err(Error::Config(format!(
                "Invalid repository format: {}. Expected owner/repo",
                input
            )));
        }
        Ok(Self::new(owner, name))
    }
}

impl fmt::Display for RepositorySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
