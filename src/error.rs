//! Error types for sqlporter.

use thiserror::Error;

/// The main error type for porter operations.
#[derive(Debug, Error)]
pub enum PorterError {
    /// Options or inputs were rejected before any work started.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The document was not valid JSON or lacked the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The backend rejected a statement. The run stops here; `executed`
    /// says how many statements had already succeeded.
    #[error("Execution error after {executed} statement(s): {detail} in statement: {statement}")]
    Execution {
        statement: String,
        detail: String,
        executed: usize,
    },

    /// Connection error from the reference backend.
    #[error("Connection error: {0}")]
    Connection(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PorterError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}

impl From<serde_json::Error> for PorterError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Error surfaced by an [`ExecutionBackend`](crate::engine::ExecutionBackend)
/// implementation; carries the backend's own message.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Result type alias for porter operations.
pub type PorterResult<T> = Result<T, PorterError>;
