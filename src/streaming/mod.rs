//! Streaming translation from the Cohere event stream to OpenAI SSE
//!
//! `decoder` turns raw upstream bytes into events, `transcoder` turns events
//! into `data: ...` frames. This module holds the SSE framing helpers and the
//! error type shared by both.

pub mod decoder;
pub mod transcoder;

use bytes::Bytes;
use thiserror::Error;

use crate::schema::ChatCompletionChunk;

pub use decoder::{Decoded, EventDecoder};
pub use transcoder::{transcode, ChunkTranscoder};

/// Errors that can occur after the SSE response has started.
///
/// Headers are already on the wire at that point, so these end the body early
/// instead of producing an error response.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Upstream bytes could not be decoded as an event
    #[error("Failed to decode upstream event: {0}")]
    Decode(String),

    /// Reading the upstream body failed
    #[error("Upstream stream error: {0}")]
    Upstream(String),

    /// A chunk could not be serialized
    #[error("Failed to encode chunk: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Format a stream chunk as an SSE data event: `data: {json}\n\n`
pub fn format_sse_chunk(chunk: &ChatCompletionChunk) -> Result<Bytes, StreamError> {
    let json = serde_json::to_string(chunk)?;
    Ok(Bytes::from(format!("data: {}\n\n", json)))
}

/// Format the SSE done marker: `data: [DONE]\n\n`
pub fn format_sse_done() -> Bytes {
    Bytes::from_static(b"data: [DONE]\n\n")
}
