//! Upstream chat provider abstraction
//!
//! Defines the interface the request handlers use to reach the chat backend,
//! so they can be exercised against a test double.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

use crate::error::AppResult;
use crate::schema::CohereChatRequest;

/// Body stream of an upstream response
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// Trait defining the interface for the upstream chat backend
///
/// Implementations perform exactly one outbound request per call and never
/// retry. The `credential` is the caller's bearer token, forwarded verbatim.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Get the provider name for logging
    fn name(&self) -> &'static str;

    /// Send a chat request and read the whole response body
    async fn chat(&self, request: &CohereChatRequest, credential: &str) -> AppResult<Bytes>;

    /// Send a chat request and hand back the open response body.
    ///
    /// Dropping the returned stream releases the upstream connection.
    async fn chat_stream(
        &self,
        request: &CohereChatRequest,
        credential: &str,
    ) -> AppResult<ByteStream>;
}
