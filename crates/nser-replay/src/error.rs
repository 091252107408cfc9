//! Error types for nser-replay

use thiserror::Error;

/// Store error type
#[derive(Debug, Error)]
pub enum Error {
    /// Run record does not exist
    #[error("run not found: {0}")]
    RunNotFound(i64),

    /// Run record already reached a terminal state
    #[error("run {0} is already finalized")]
    AlreadyFinalized(i64),

    /// Requested status change is not a valid lifecycle transition
    #[error("invalid status transition: {0}")]
    InvalidTransition(String),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
