//! Transport error types.

use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors that stop a transport from serving.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The requested transport is not compiled in or not recognized.
    #[error("Unsupported transport '{0}'")]
    Unsupported(String),

    /// The MCP handshake with the host failed.
    #[error("Server initialization error: {0}")]
    InitError(String),

    /// The session ended with an error.
    #[error("Service error: {0}")]
    ServiceError(String),
}

impl TransportError {
    /// Create an initialization error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::InitError(msg.into())
    }

    /// Create a service error.
    pub fn service(msg: impl Into<String>) -> Self {
        Self::ServiceError(msg.into())
    }
}
