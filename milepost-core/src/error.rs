//! Error types for milepost

use thiserror::Error;

/// Result type alias for milepost core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for milepost core operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No usable token could be obtained
    #[error("Credential error: {0}")]
    Credential(String),

    /// Assignment plan could not be read or is inconsistent
    #[error("Plan error: {0}")]
    Plan(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
