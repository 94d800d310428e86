//! Wire types for both sides of the gateway
//!
//! `openai` holds the shapes presented to callers, `cohere` the shapes
//! exchanged with the upstream chat API.

pub mod cohere;
pub mod openai;

pub use cohere::{
    BilledUnits, CohereChatRequest, CohereChatResponse, CohereMessage, CohereRole,
    CohereStreamEvent, ResponseMeta,
};
pub use openai::{
    ChatCompletionChoice, ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse,
    ChatMessage, ChunkChoice, ContentPart, Delta, FinishReason, MessageContent, ResponseMessage,
    Role, Usage,
};
