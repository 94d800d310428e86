//! Error types for cohere-bridge
//!
//! Every failure that happens before response headers are sent is turned into
//! a JSON body of the form `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid Authorization header format")]
    MalformedCredential,

    #[error("Invalid request body: {0}")]
    MalformedInboundBody(String),

    #[error("Stream is not enabled")]
    UnsupportedMode,

    #[error("Upstream request failed: {0}")]
    UpstreamTransport(#[from] reqwest::Error),

    #[error("Upstream returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Failed to decode upstream response: {0}")]
    UpstreamDecode(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status reported to the caller
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MalformedCredential
            | AppError::MalformedInboundBody(_)
            | AppError::UnsupportedMode => StatusCode::BAD_REQUEST,
            AppError::UpstreamTransport(_)
            | AppError::UpstreamStatus { .. }
            | AppError::UpstreamDecode(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
