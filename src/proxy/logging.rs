//! Request logging utilities
//!
//! Provides structured logging with short correlation IDs so a single chat
//! request can be followed through the logs.

use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;

/// Context for tracking a request through the system
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request (for log correlation)
    pub trace_id: String,
    /// When the request started
    pub start_time: Instant,
    /// Upstream provider handling this request
    pub provider: &'static str,
    /// Normalized model name
    pub model: String,
    /// Whether this is a streaming request
    pub streaming: bool,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(provider: &'static str, model: impl Into<String>, streaming: bool) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string()[..8].to_string(), // Short ID for readability
            start_time: Instant::now(),
            provider,
            model: model.into(),
            streaming,
        }
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    /// Log request initiation
    pub fn log_request_start(&self, requested_model: &str, turns: usize) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            model = %self.model,
            requested_model = %requested_model,
            streaming = %self.streaming,
            turns = turns,
            "Request started"
        );
    }

    /// Log a request whose full response has been produced
    pub fn log_request_complete(&self) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            model = %self.model,
            streaming = %self.streaming,
            elapsed_ms = %self.elapsed_ms(),
            "Request completed"
        );
    }

    /// Log that SSE headers went out; completion is logged by the stream
    pub fn log_response_started(&self) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            model = %self.model,
            elapsed_ms = %self.elapsed_ms(),
            "Response started"
        );
    }

    /// Log a stream that delivered its terminator
    pub fn log_stream_complete(&self, frames_sent: usize) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            model = %self.model,
            streaming = %self.streaming,
            frames_sent = frames_sent,
            elapsed_ms = %self.elapsed_ms(),
            "Request completed"
        );
    }

    /// Log a stream that ended without its terminator
    pub fn log_stream_aborted(&self, frames_sent: usize, reason: &str) {
        warn!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            model = %self.model,
            frames_sent = frames_sent,
            elapsed_ms = %self.elapsed_ms(),
            reason = %reason,
            "Stream aborted"
        );
    }

    /// Log a failed request
    pub fn log_request_error(&self, error: &AppError) {
        warn!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            model = %self.model,
            streaming = %self.streaming,
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Request failed"
        );
    }
}
