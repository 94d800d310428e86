//! Mock infrastructure for testing external services
//!
//! Provides a wiremock-based stand-in for the Cohere chat API that supports
//! streaming, non-streaming and error scenarios.


pub use cohere::*;
