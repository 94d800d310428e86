//! Cohere event stream to OpenAI chunk stream
//!
//! The transcoder is pull-based: every frame the client consumes pulls at most
//! one read from the upstream body. Dropping the output stream drops the
//! upstream body with it, which releases the connection.

use bytes::Bytes;
use chrono::Utc;
use futures::{Stream, StreamExt};
use tracing::{debug, error, warn};

use super::{format_sse_chunk, format_sse_done, Decoded, EventDecoder, StreamError};
use crate::proxy::RequestContext;
use crate::schema::CohereStreamEvent;
use crate::translate::{announcement_chunk, content_chunk, stop_chunk};

/// Per-stream state machine mapping upstream events to SSE frames
#[derive(Debug)]
pub struct ChunkTranscoder {
    model: String,
    first_chunk_sent: bool,
    finished: bool,
}

impl ChunkTranscoder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            first_chunk_sent: false,
            finished: false,
        }
    }

    /// Whether the terminal event has been processed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Map one upstream event to the frames it produces.
    ///
    /// A finished event yields the stop chunk followed by `[DONE]`; events
    /// after it are ignored. The first non-finished event yields an empty
    /// announcement chunk, plus a content chunk if it already carries text.
    pub fn process(
        &mut self,
        event: &CohereStreamEvent,
        created: i64,
    ) -> Result<Vec<Bytes>, StreamError> {
        if self.finished {
            return Ok(Vec::new());
        }

        if event.is_finished {
            self.finished = true;
            return Ok(vec![
                format_sse_chunk(&stop_chunk(&self.model, created))?,
                format_sse_done(),
            ]);
        }

        let mut frames = Vec::with_capacity(2);
        if !self.first_chunk_sent {
            self.first_chunk_sent = true;
            frames.push(format_sse_chunk(&announcement_chunk(&self.model, created))?);
            if event.text.is_empty() {
                return Ok(frames);
            }
        }
        frames.push(format_sse_chunk(&content_chunk(
            &self.model,
            created,
            &event.text,
        ))?);

        Ok(frames)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Active,
    Completed,
    Failed,
    Truncated,
}

/// Logs how the stream ended once the body is finished or dropped
struct Lifecycle {
    ctx: RequestContext,
    frames_sent: usize,
    outcome: Outcome,
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        let reason = match self.outcome {
            Outcome::Completed => {
                self.ctx.log_stream_complete(self.frames_sent);
                return;
            }
            Outcome::Active => "client disconnected",
            Outcome::Failed => "upstream error",
            Outcome::Truncated => "upstream ended before a finished event",
        };
        self.ctx.log_stream_aborted(self.frames_sent, reason);
    }
}

/// Transcode an upstream byte stream into OpenAI SSE frames.
///
/// Ends after `[DONE]`, on the first decode or read error (yielded as `Err`),
/// or silently when the upstream ends without a finished event. Frames are
/// stamped with `ctx.model`, and the request's completion is logged against
/// `ctx` when the stream ends or is dropped.
pub fn transcode<S, E>(
    source: S,
    ctx: RequestContext,
) -> impl Stream<Item = Result<Bytes, StreamError>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::error::Error + Send + 'static,
{
    async_stream::stream! {
        let mut transcoder = ChunkTranscoder::new(ctx.model.clone());
        let mut lifecycle = Lifecycle {
            ctx,
            frames_sent: 0,
            outcome: Outcome::Active,
        };
        let mut decoder = EventDecoder::new();
        futures::pin_mut!(source);

        while let Some(read) = source.next().await {
            let bytes = match read {
                Ok(bytes) => bytes,
                Err(e) => {
                    lifecycle.outcome = Outcome::Failed;
                    error!(
                        trace_id = %lifecycle.ctx.trace_id,
                        error = %e,
                        "Upstream read failed mid-stream"
                    );
                    yield Err(StreamError::Upstream(e.to_string()));
                    return;
                }
            };

            let Decoded { events, error: decode_error } = decoder.feed(&bytes);

            for event in events {
                let frames = match transcoder.process(&event, Utc::now().timestamp()) {
                    Ok(frames) => frames,
                    Err(e) => {
                        lifecycle.outcome = Outcome::Failed;
                        error!(trace_id = %lifecycle.ctx.trace_id, error = %e, "Aborting stream");
                        yield Err(e);
                        return;
                    }
                };

                let finished = transcoder.is_finished();
                if finished {
                    lifecycle.outcome = Outcome::Completed;
                    debug!(
                        trace_id = %lifecycle.ctx.trace_id,
                        finish_reason = ?event.finish_reason,
                        "Upstream stream finished"
                    );
                }

                for frame in frames {
                    lifecycle.frames_sent += 1;
                    yield Ok(frame);
                }

                if finished {
                    return;
                }
            }

            // Only reached when no finished event preceded the bad bytes
            if let Some(e) = decode_error {
                lifecycle.outcome = Outcome::Failed;
                error!(trace_id = %lifecycle.ctx.trace_id, error = %e, "Aborting stream");
                yield Err(e);
                return;
            }
        }

        lifecycle.outcome = Outcome::Truncated;
        if decoder.has_incomplete() {
            warn!(
                trace_id = %lifecycle.ctx.trace_id,
                remaining_bytes = decoder.remaining().len(),
                "Upstream ended inside an event"
            );
        }
    }
}
