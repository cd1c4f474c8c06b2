//! HTTP error taxonomy and response mapping.
//!
//! Every handler failure becomes `{"error": {"code": ..., "message": ...}}`
//! with a stable code so clients can branch without parsing messages.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use localize_core::CoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Message returned for every missing translation key.
pub const NOT_FOUND_MESSAGE: &str = "Translation key not found";

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body or query string failed validation (E1001).
    #[error("{0}")]
    InvalidInput(String),

    /// No translation key with the requested id (E1002).
    #[error("Translation key not found")]
    NotFound,

    /// Another translation key already uses this key text (E1003).
    #[error("Translation key '{key}' already exists")]
    DuplicateKey {
        /// The conflicting key text
        key: String,
    },

    /// A bulk update matched no existing keys (E1004).
    #[error("Failed to update translations")]
    BulkUpdateFailed,

    /// The backing store failed (E3001).
    #[error("Database error: {0}")]
    Store(#[source] CoreError),
}

impl ApiError {
    /// Returns the error code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "E1001",
            Self::NotFound => "E1002",
            Self::DuplicateKey { .. } => "E1003",
            Self::BulkUpdateFailed => "E1004",
            Self::Store(_) => "E3001",
        }
    }

    /// Returns the HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::DuplicateKey { .. } => StatusCode::CONFLICT,
            Self::BulkUpdateFailed => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts a store error raised while writing `key`.
    ///
    /// Unique violations become `DuplicateKey`; everything else goes
    /// through the generic conversion.
    pub fn from_write(err: CoreError, key: &str) -> Self {
        if err.is_unique_violation() {
            Self::DuplicateKey { key: key.to_string() }
        } else {
            Self::from(err)
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(_) => Self::NotFound,
            CoreError::InvalidInput(msg) => Self::InvalidInput(msg),
            other => Self::Store(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details including code and message
    pub error: ErrorDetail,
}

/// Detailed error information.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Stable error code
    pub code: String,
    /// Human-readable error description
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Store(source) => {
                error!(error = %source, code = self.code(), "Store operation failed");
                "Internal server error".to_string()
            },
            other => other.to_string(),
        };

        let body = ErrorResponse { error: ErrorDetail { code: self.code().to_string(), message } };

        (self.status(), Json(body)).into_response()
    }
}
