//! Error types for nser-tools

use thiserror::Error;

/// Tool error type
#[derive(Debug, Error)]
pub enum Error {
    /// Tool name is not registered
    #[error("unknown tool: {0:?}")]
    NotFound(String),

    /// Tool binary could not be resolved on the search path
    #[error("tool {tool:?} not found in PATH (binary {binary:?})")]
    NotInstalled {
        /// Registry name
        tool: String,
        /// Executable that was looked up
        binary: String,
    },

    /// Subprocess could not be executed
    #[error("execution failed: {0}")]
    Execution(String),

    /// Run record could not be written
    #[error("run record: {0}")]
    Persistence(#[from] nser_replay::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
