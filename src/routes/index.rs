//! Welcome and fallback handlers

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: &'static str,
}

/// Body returned for unmatched routes
#[derive(Debug, Serialize)]
pub struct NotFoundResponse {
    pub code: u16,
    pub message: &'static str,
}

pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to cohere-bridge, an OpenAI-compatible gateway for the Cohere chat API",
    })
}

pub async fn not_found() -> (StatusCode, Json<NotFoundResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            code: StatusCode::NOT_FOUND.as_u16(),
            message: "Path not found",
        }),
    )
}
