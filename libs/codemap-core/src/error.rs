//! Error types for codemap-core

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the selection and mapping workflows.
///
/// `Validation` is reported before any collaborator call is made. The other
/// variants come back from the data-access collaborator and leave the caller's
/// state untouched (except where a workflow documents otherwise).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Rejected by server: {0}")]
    Rejected(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Error::Transport(message.into())
    }

    /// True when the error was raised locally, without contacting the backend.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::NotFound(_))
    }
}
