//! Proxy module
//!
//! Handles request forwarding to the upstream chat API.

pub mod cohere;
pub mod headers;
pub mod logging;
pub mod provider;

pub use cohere::CohereClient;
pub use logging::RequestContext;
pub use provider::{ByteStream, ChatProvider};
