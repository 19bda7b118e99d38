//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// The server answered with a status the operation does not accept
    #[error("GitHub request failed with status {status}: {body}")]
    Request {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Transport-level failure (connection, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GitHub API error reported through octocrab
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// HTTP status of a rejected request
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<milepost_core::Error> for Error {
    fn from(err: milepost_core::Error) -> Self {
        match err {
            milepost_core::Error::Credential(msg) => Error::Auth(msg),
            other => Error::Other(other.to_string()),
        }
    }
}
