//! Error types for codemap-client

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Mapping backend client errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{context}: {status}")]
    Status {
        context: String,
        status: reqwest::StatusCode,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl From<Error> for codemap_core::Error {
    fn from(err: Error) -> Self {
        codemap_core::Error::Transport(err.to_string())
    }
}
