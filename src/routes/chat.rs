//! Chat completions endpoint
//!
//! OpenAI-compatible chat completions API endpoint backed by Cohere.
//! Handles both streaming and non-streaming responses.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    proxy::{headers::credential_from_headers, RequestContext},
    schema::{ChatCompletionRequest, CohereChatRequest, CohereChatResponse},
    streaming::transcode,
    translate::{to_cohere_request, to_openai_response},
    AppState,
};

/// Handle chat completion requests
///
/// Parses the OpenAI-shaped body, maps it to a Cohere request and answers with
/// either an SSE stream or a single `chat.completion` document.
pub async fn chat_completions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let request = ChatCompletionRequest::from_slice(&body)?;
    let upstream_request = to_cohere_request(&request);

    let ctx = RequestContext::new(
        state.provider.name(),
        upstream_request.model.clone(),
        request.stream,
    );
    ctx.log_request_start(&request.model, request.messages.len());
    if let Some(max_tokens) = request.max_tokens {
        debug!(
            trace_id = %ctx.trace_id,
            requested = max_tokens,
            applied = upstream_request.max_tokens,
            "Ignoring client max_tokens"
        );
    }

    let result = dispatch(&state, &headers, &request, &upstream_request, &ctx).await;
    match &result {
        // The stream logs its own completion once the last frame is out
        Ok(_) if request.stream => ctx.log_response_started(),
        Ok(_) => ctx.log_request_complete(),
        Err(e) => ctx.log_request_error(e),
    }
    result
}

async fn dispatch(
    state: &AppState,
    headers: &HeaderMap,
    request: &ChatCompletionRequest,
    upstream_request: &CohereChatRequest,
    ctx: &RequestContext,
) -> AppResult<Response> {
    if !request.stream && state.config.stream_only {
        return Err(AppError::UnsupportedMode);
    }

    let credential = credential_from_headers(headers)?;

    if request.stream {
        handle_streaming(state, upstream_request, credential, ctx.clone()).await
    } else {
        handle_non_streaming(state, upstream_request, credential).await
    }
}

/// Handle non-streaming chat completion
async fn handle_non_streaming(
    state: &AppState,
    upstream_request: &CohereChatRequest,
    credential: &str,
) -> AppResult<Response> {
    let raw = state.provider.chat(upstream_request, credential).await?;

    let response: CohereChatResponse = serde_json::from_slice(&raw)
        .map_err(|e| AppError::UpstreamDecode(e.to_string()))?;

    let document = to_openai_response(&response, &upstream_request.model, Utc::now().timestamp());

    Ok((StatusCode::OK, Json(document)).into_response())
}

/// Handle streaming chat completion
async fn handle_streaming(
    state: &AppState,
    upstream_request: &CohereChatRequest,
    credential: &str,
    ctx: RequestContext,
) -> AppResult<Response> {
    let source = state
        .provider
        .chat_stream(upstream_request, credential)
        .await?;

    // The body owns the upstream stream; hyper drops it when the client goes away
    let body = Body::from_stream(transcode(source, ctx));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .header("X-Accel-Buffering", "no")
        .body(body)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))
}
