//! Error types for opsmesh-a2a

use thiserror::Error;

/// A2A error type
///
/// Every variant carries the peer endpoint so callers can surface a
/// diagnostic naming the agent that failed.
#[derive(Debug, Error)]
pub enum Error {
    /// The peer could not be reached or returned a transport-level failure
    #[error("communication error with {endpoint}: {message}")]
    Transport {
        /// Peer endpoint that failed
        endpoint: String,
        /// Underlying failure description
        message: String,
    },

    /// The peer answered with something the protocol does not describe
    #[error("malformed response from {endpoint}: {message}")]
    Malformed {
        /// Peer endpoint that failed
        endpoint: String,
        /// What was wrong with the payload
        message: String,
    },

    /// The remote task finished in the failed state
    #[error("remote task failed at {endpoint}: {message}")]
    TaskFailed {
        /// Peer endpoint that failed
        endpoint: String,
        /// Failure message reported by the peer
        message: String,
    },

    /// The task never completed within the polling budget
    #[error("timed out waiting for {endpoint} - no response received")]
    Timeout {
        /// Peer endpoint that timed out
        endpoint: String,
    },
}

impl Error {
    /// The peer endpoint this error refers to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Malformed { endpoint, .. }
            | Self::TaskFailed { endpoint, .. }
            | Self::Timeout { endpoint } => endpoint,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
