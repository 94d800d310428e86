//! cohere-bridge - OpenAI-compatible gateway for the Cohere chat API
//!
//! This library provides the protocol adapter behind the gateway: schema
//! mapping between the two chat formats, the upstream client, and the stream
//! transcoder that re-emits Cohere events as OpenAI server-sent events.

pub mod config;
pub mod error;
pub mod proxy;
pub mod routes;
pub mod schema;
pub mod streaming;
pub mod translate;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

pub use crate::config::Config;
pub use crate::error::{AppError, AppResult};
pub use crate::proxy::{ChatProvider, CohereClient};

/// Application state shared across all request handlers
///
/// Read-only after startup; handlers never mutate it.
pub struct AppState {
    pub config: Config,
    /// Upstream chat backend
    pub provider: Arc<dyn ChatProvider>,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        // Initialize HTTP client with connection pooling
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let provider: Arc<dyn ChatProvider> = Arc::new(CohereClient::new(http_client, &config));

        Ok(Self::with_provider(config, provider))
    }

    /// Create an application state around an existing provider
    pub fn with_provider(config: Config, provider: Arc<dyn ChatProvider>) -> Self {
        Self { config, provider }
    }
}
