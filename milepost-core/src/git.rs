//! Repository detection from the local git checkout

use std::path::Path;

use git2::Repository;
use tracing::debug;

use crate::{Error, RepositorySlug, Result};

/// Find the GitHub repository of the checkout containing `path`
///
/// Uses the `origin` remote, falling back to the first remote with a URL.
/// Returns `Ok(None)` when `path` is not inside a git repository.
pub fn detect_repository(path: impl AsRef<Path>) -> Result<Option<RepositorySlug>> {
    let path = path.as_ref();

    let repo = match Repository::discover(path) {
        Ok(repo) => repo,
        Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
        Err(e) => return Err(Error::Other(format!("Git error: {}", e))),
    };

    let Some(url) = remote_url(&repo)? else {
        return Ok(None);
    };

    debug!(url = %url, "Detected git remote");
    RepositorySlug::parse(&url).map(Some)
}

fn remote_url(repo: &Repository) -> Result<Option<String>> {
    if let Ok(remote) = repo.find_remote("origin") {
        if let Some(url) = remote.url() {
            return Ok(Some(url.to_string()));
        }
    }

    let remotes = repo
        .remotes()
        .map_err(|e| Error::Other(format!("Failed to list remotes: {}", e)))?;

    for remote_name in remotes.iter().flatten() {
        if let Ok(remote) = repo.find_remote(remote_name) {
            if let Some(url) = remote.url() {
                return Ok(Some(url.to_string()));
            }
        }
    }

    Ok(None)
}
