//! Tool-specific error types.

use thiserror::Error;

/// Errors that can occur while registering or executing tools.
///
/// When a handler returns one of these, the dispatcher turns it into an
/// error result whose text is `Error: <display>`. Messages must never carry
/// credential values.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Unknown tool: {0}")]
    NotFound(String),

    /// Two tools were registered under the same name.
    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    /// Arguments were structurally valid but unusable.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// A required environment variable is not set. Holds the variable name only.
    #[error("Missing required configuration: {0} is not set")]
    MissingConfig(String),

    /// The tool ran and failed.
    #[error("{0}")]
    ExecutionFailed(String),

    /// An outbound HTTP request failed.
    #[error("Request failed: {0}")]
    Http(String),

    /// The database rejected an operation.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding of a result failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a new "missing configuration" error for an environment variable.
    pub fn missing_config(var: impl Into<String>) -> Self {
        Self::MissingConfig(var.into())
    }

    /// Create a new "execution failed" error.
    pub fn execution_failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// URLs are dropped so query-string credentials cannot leak into messages.
impl From<reqwest::Error> for ToolError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            Self::Http("request timed out".to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}
