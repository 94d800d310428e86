//! Configuration management for cohere-bridge
//!
//! Configuration is loaded from environment variables. Command-line flags
//! parsed in `main` take precedence over the environment.

use anyhow::{Context, Result};
use std::env;

/// Port used when neither a flag nor `BRIDGE_PORT` is given
pub const DEFAULT_PORT: u16 = 6600;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Cohere API base URL (without the `/v1/chat` suffix)
    pub cohere_api_url: String,
    /// Timeout applied to each outbound request, in seconds
    pub request_timeout_secs: u64,

    /// Reject `stream=false` requests instead of translating them
    pub stream_only: bool,
}

/// Values given on the command line; each one wins over its env var
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables and command-line overrides
    pub fn from_env(overrides: Overrides) -> Result<Self> {
        Self::from_lookup_with(overrides, |key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup_with(Overrides::default(), lookup)
    }

    /// Load configuration from a key lookup, resolving overrides first.
    ///
    /// An overridden value is never read from the lookup, so a malformed env
    /// var behind a flag does not fail startup.
    pub fn from_lookup_with<F>(overrides: Overrides, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match overrides.port {
            Some(port) => port,
            None => parse_port(lookup("BRIDGE_PORT").as_deref())?,
        };

        Ok(Self {
            host: overrides
                .host
                .or_else(|| lookup("BRIDGE_HOST"))
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port,

            cohere_api_url: lookup("COHERE_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "https://api.cohere.ai".to_string()),
            request_timeout_secs: lookup("BRIDGE_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|| "300".to_string())
                .parse()
                .context("Invalid BRIDGE_REQUEST_TIMEOUT_SECS")?,

            stream_only: lookup("BRIDGE_STREAM_ONLY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }
}

/// Parse `BRIDGE_PORT`, falling back to [`DEFAULT_PORT`] when unset
fn parse_port(env_value: Option<&str>) -> Result<u16> {
    match env_value {
        Some(raw) => raw.trim().parse().context("Invalid BRIDGE_PORT"),
        None => Ok(DEFAULT_PORT),
    }
}
