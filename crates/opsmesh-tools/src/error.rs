//! Error types for opsmesh-tools

use thiserror::Error;

/// Tool error type
#[derive(Debug, Error)]
pub enum Error {
    /// Tool not found in the registry
    #[error("tool not found: {0}")]
    NotFound(String),

    /// Invalid tool input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Backing store failure
    #[error("store error: {0}")]
    Store(String),

    /// Tool execution failed
    #[error("execution error: {0}")]
    Execution(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
