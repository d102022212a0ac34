//! Error types for opsmesh-core

use thiserror::Error;

/// Core error type
///
/// Tool failures inside a specialist loop never surface here; they are
/// carried as textual turns. Only generation failures and wiring bugs
/// propagate to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Text-generation failure
    #[error("llm error: {0}")]
    Llm(#[from] opsmesh_llm::Error),

    /// Tool registry wiring failure (a binding names an unregistered tool)
    #[error("tool error: {0}")]
    Tool(#[from] opsmesh_tools::Error),

    /// Internal invariant violation
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
