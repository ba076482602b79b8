//! Error types for the tool-server runtime

use thiserror::Error;

/// Failures reported to the caller as a protocol-level error response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Unknown request kind or tool name.
    #[error("{0}")]
    MethodNotFound(String),

    /// The request could be decoded but not understood.
    #[error("{0}")]
    InvalidRequest(String),

    /// Unexpected failure while building the response.
    #[error("{0}")]
    Internal(String),
}

impl ProtocolError {
    /// Wire code for the error object.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MethodNotFound(_) => "METHOD_NOT_FOUND",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Failure of a tool invocation. Never propagated as a protocol error; it is
/// reported inside the result envelope with `isError: true`.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments missing or of the wrong type.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool ran and failed.
    #[error("{0}")]
    Failed(String),
}

/// Errors from reading or writing the line stream.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transport is closed")]
    Closed,
}
