//! Cohere chat API client
//!
//! Handles request forwarding to `POST /v1/chat`.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, error, instrument};

use super::headers::build_upstream_headers;
use super::provider::{ByteStream, ChatProvider};
use crate::{
    config::Config,
    error::{AppError, AppResult},
    schema::CohereChatRequest,
};

/// Cohere chat API client
pub struct CohereClient {
    client: reqwest::Client,
    base_url: String,
}

impl CohereClient {
    /// Create a new Cohere client
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.cohere_api_url.clone(),
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/v1/chat", self.base_url)
    }

    /// Send the request and fail on any non-2xx status
    async fn post(
        &self,
        request: &CohereChatRequest,
        credential: &str,
    ) -> AppResult<reqwest::Response> {
        let url = self.chat_url();
        debug!(
            url = %url,
            model = %request.model,
            stream = request.stream,
            history = request.chat_history.len(),
            "Sending request to Cohere"
        );

        let response = self
            .client
            .post(&url)
            .headers(build_upstream_headers(credential)?)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "Failed to send request to Cohere");
                e
            })?;

        let status = response.status();
        debug!(url = %url, status = %status, "Received response from Cohere");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatProvider for CohereClient {
    fn name(&self) -> &'static str {
        "cohere"
    }

    #[instrument(skip_all, fields(model = %request.model))]
    async fn chat(&self, request: &CohereChatRequest, credential: &str) -> AppResult<Bytes> {
        let response = self.post(request, credential).await?;
        Ok(response.bytes().await?)
    }

    #[instrument(skip_all, fields(model = %request.model))]
    async fn chat_stream(
        &self,
        request: &CohereChatRequest,
        credential: &str,
    ) -> AppResult<ByteStream> {
        let response = self.post(request, credential).await?;
        Ok(Box::pin(response.bytes_stream()))
    }
}
