//! Error types for curl-agent.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    /// The legacy open mode named anything other than a read-only indicator.
    #[error("invalid access mode {mode} (resource is read only)")]
    InvalidMode { mode: String },

    /// The transfer engine failed (DNS, connect, TLS, timeout, truncated
    /// transfer). Surfaced unchanged; this layer does not retry or
    /// reclassify.
    #[cfg(feature = "curl")]
    #[error("transfer failed: {0}")]
    Transfer(#[from] curl::Error),

    /// Failure from an alternative [`TransferEngine`](crate::TransferEngine)
    /// implementation.
    #[error("engine error: {0}")]
    Engine(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// I/O failure while a caller reads the buffered result. Never built
    /// by the crate itself; exists so callers can `?` their `Read` calls
    /// into the same `Result`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        let err: AgentError = io::Error::new(io::ErrorKind::UnexpectedEof, "short read").into();
        assert!(matches!(err, AgentError::Io(_)));
    }
}
