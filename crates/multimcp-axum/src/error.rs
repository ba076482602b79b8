//! HTTP error type and its mapping from registry errors.
//!
//! Every error leaves the server as a `{ "success": false, "error": ... }`
//! envelope. Storage and I/O details are logged and never sent to the caller.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use multimcp_core::RegistryError;
use thiserror::Error;
use tracing::error;

use crate::dto::ApiResponse;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Unknown server or snapshot.
    #[error("{0}")]
    NotFound(String),

    /// Invalid input, including an unreadable request body.
    #[error("{0}")]
    BadRequest(String),

    /// Name taken or entry protected.
    #[error("{0}")]
    Conflict(String),

    /// Anything the caller cannot act on. The payload is only logged.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HttpError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::NotFound(msg) | Self::BadRequest(msg) | Self::Conflict(msg) => msg,
            Self::Internal(detail) => {
                error!(error = %detail, "Request failed");
                INTERNAL_MESSAGE.to_string()
            }
        };

        (status, Json(ApiResponse::<()>::failure(message))).into_response()
    }
}

impl From<RegistryError> for HttpError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(_) | RegistryError::BackupNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            RegistryError::Conflict(msg) => Self::Conflict(msg),
            RegistryError::Validation(_) | RegistryError::InvalidBackup { .. } => {
                Self::BadRequest(err.to_string())
            }
            RegistryError::Store(_) | RegistryError::Io(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
