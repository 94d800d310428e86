//! Schema mapping between the OpenAI and Cohere chat formats
//!
//! Everything in here is pure: no I/O and no clock reads. Timestamps are passed
//! in by the caller at emission time.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::schema::{
    ChatCompletionChoice, ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse,
    ChunkChoice, CohereChatRequest, CohereChatResponse, CohereMessage, CohereRole, Delta,
    FinishReason, ResponseMessage, Role, Usage,
};

/// Model substituted for anything outside the supported set
pub const DEFAULT_MODEL: &str = "command-r-plus";

/// Completion id shared by every emitted chunk and document
pub const COMPLETION_ID: &str = "chatcmpl-123";

/// Token cap used for a model missing from [`MODEL_TOKEN_CAPS`]
pub const FALLBACK_MAX_TOKENS: u32 = 4096;

/// Models accepted by the upstream API, in listing order
pub const SUPPORTED_MODELS: [&str; 6] = [
    "command-r",
    "command-r-plus",
    "command-light",
    "command-light-nightly",
    "command",
    "command-nightly",
];

/// Upstream `max_tokens` per supported model
pub static MODEL_TOKEN_CAPS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    HashMap::from([
        ("command-r-plus", 4000),
        ("command-r", 4000),
        ("command", 4000),
        ("command-light", 4000),
        ("command-light-nightly", 4000),
        ("command-nightly", 4000),
    ])
});

/// Return `model` if the upstream accepts it, otherwise [`DEFAULT_MODEL`]
pub fn normalize_model(model: &str) -> &str {
    if MODEL_TOKEN_CAPS.contains_key(model) {
        model
    } else {
        DEFAULT_MODEL
    }
}

/// Upstream token cap for a model
pub fn max_tokens_for(model: &str) -> u32 {
    MODEL_TOKEN_CAPS
        .get(model)
        .copied()
        .unwrap_or(FALLBACK_MAX_TOKENS)
}

fn cohere_role(role: Role) -> CohereRole {
    match role {
        Role::Assistant => CohereRole::Chatbot,
        Role::System => CohereRole::System,
        Role::User | Role::Other => CohereRole::User,
    }
}

/// Convert an OpenAI chat request into a Cohere chat request.
///
/// Each `user` turn overwrites `message`, so the last one wins. All other
/// turns go to `chat_history` in their original order. Client `max_tokens`
/// is ignored in favour of the per-model cap.
pub fn to_cohere_request(request: &ChatCompletionRequest) -> CohereChatRequest {
    let model = normalize_model(&request.model);
    let mut message = String::new();
    let mut chat_history = Vec::new();

    for turn in &request.messages {
        match turn.role() {
            Role::User => message = turn.text(),
            role => chat_history.push(CohereMessage {
                role: cohere_role(role),
                message: turn.text(),
            }),
        }
    }

    CohereChatRequest {
        model: model.to_string(),
        chat_history,
        message,
        stream: request.stream,
        max_tokens: max_tokens_for(model),
    }
}

fn chunk(
    model: &str,
    created: i64,
    delta: Delta,
    finish_reason: Option<FinishReason>,
) -> ChatCompletionChunk {
    ChatCompletionChunk {
        id: COMPLETION_ID.to_string(),
        object: "chat.completion.chunk".to_string(),
        created,
        model: model.to_string(),
        choices: vec![ChunkChoice {
            index: 0,
            delta,
            logprobs: None,
            finish_reason,
        }],
    }
}

/// First frame of a stream: announces the turn without content
pub fn announcement_chunk(model: &str, created: i64) -> ChatCompletionChunk {
    chunk(model, created, Delta::default(), None)
}

/// Content frame; empty text leaves `content` out of the delta
pub fn content_chunk(model: &str, created: i64, text: &str) -> ChatCompletionChunk {
    let delta = Delta {
        role: None,
        content: (!text.is_empty()).then(|| text.to_string()),
    };
    chunk(model, created, delta, None)
}

/// Final frame before `[DONE]`
pub fn stop_chunk(model: &str, created: i64) -> ChatCompletionChunk {
    chunk(model, created, Delta::default(), Some(FinishReason::Stop))
}

fn usage_from(response: &CohereChatResponse) -> Option<Usage> {
    let units = response.meta.as_ref()?.billed_units.as_ref()?;
    let count = |n: &Option<serde_json::Number>| {
        n.as_ref()
            .and_then(|n| n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)))
            .unwrap_or(0)
    };
    let prompt_tokens = count(&units.input_tokens);
    let completion_tokens = count(&units.output_tokens);

    Some(Usage {
        prompt_tokens,
        completion_tokens,
        total_tokens: prompt_tokens.saturating_add(completion_tokens),
    })
}

/// Wrap a complete Cohere response as a `chat.completion` document
pub fn to_openai_response(
    response: &CohereChatResponse,
    model: &str,
    created: i64,
) -> ChatCompletionResponse {
    ChatCompletionResponse {
        id: COMPLETION_ID.to_string(),
        object: "chat.completion".to_string(),
        created,
        model: model.to_string(),
        choices: vec![ChatCompletionChoice {
            index: 0,
            message: ResponseMessage {
                role: "assistant".to_string(),
                content: response.text.clone(),
            },
            finish_reason: Some(FinishReason::Stop),
        }],
        usage: usage_from(response),
    }
}
