//! Cohere chat API (v1) request and response types

use serde::{Deserialize, Serialize};

/// Speaker of a chat history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CohereRole {
    User,
    Chatbot,
    System,
}

/// One prior turn in `chat_history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohereMessage {
    pub role: CohereRole,
    pub message: String,
}

/// Body of `POST /v1/chat`
///
/// The latest user turn travels in `message`; everything else is history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohereChatRequest {
    pub model: String,
    pub chat_history: Vec<CohereMessage>,
    pub message: String,
    pub stream: bool,
    pub max_tokens: u32,
}

/// One event of a streaming `/v1/chat` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohereStreamEvent {
    #[serde(default)]
    pub is_finished: bool,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub text: String,
    /// Only present on `stream-end`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Token accounting reported by Cohere
///
/// Counts are kept as JSON numbers so large values survive decoding intact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BilledUnits {
    #[serde(default)]
    pub input_tokens: Option<serde_json::Number>,
    #[serde(default)]
    pub output_tokens: Option<serde_json::Number>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    #[serde(default)]
    pub billed_units: Option<BilledUnits>,
}

/// Body of a non-streaming `/v1/chat` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohereChatResponse {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub generation_id: Option<String>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub meta: Option<ResponseMeta>,
}
