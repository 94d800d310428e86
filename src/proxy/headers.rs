//! Header utilities for upstream requests
//!
//! The caller's bearer token is the only header carried over from the inbound
//! request; everything else is rebuilt from scratch.

use axum::http::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};

use crate::error::{AppError, AppResult};

/// Extract the bearer token from an `Authorization` header value
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Pull the caller's credential out of the inbound headers.
///
/// The token itself is not validated; the upstream API is the authority on it.
pub fn credential_from_headers(headers: &HeaderMap) -> AppResult<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_bearer_token)
        .ok_or(AppError::MalformedCredential)
}

/// Build the headers for an upstream chat request
pub fn build_upstream_headers(credential: &str) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();

    let authorization = HeaderValue::from_str(&format!("Bearer {}", credential))
        .map_err(|_| AppError::MalformedCredential)?;
    headers.insert(AUTHORIZATION, authorization);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Ok(headers)
}
