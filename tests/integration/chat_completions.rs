//! Chat completions endpoint integration tests
//!
//! Tests for POST /v1/chat/completions:
//! - Streaming translation of Cohere events into OpenAI SSE chunks
//! - Non-streaming translation of a single Cohere document
//! - Request validation and upstream failures

use axum::http::{header, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{
    auth_header, constants::TEST_COHERE_KEY, content_type, sse_payloads, test_config,
    test_data, test_server, TestHarness,
};
use crate::mocks::CohereTestData;

// ============================================================================
// Streaming
// ============================================================================

#[tokio::test]
async fn test_streaming_translates_events_to_sse() {
    let harness = TestHarness::new().await;
    harness
        .cohere
        .mock_chat_stream(&CohereTestData::hello_world_events())
        .await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .add_header(header::AUTHORIZATION, auth_header())
        .json(&test_data::streaming_request("command-r"))
        .await;

    response.assert_status_ok();
    assert_eq!(content_type(&response), "text/event-stream");
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-cache"
    );

    let payloads = sse_payloads(&response.text());
    assert_eq!(payloads.len(), 5, "payloads: {:?}", payloads);
    assert_eq!(payloads.last().unwrap(), "[DONE]");

    let chunks: Vec<Value> = payloads[..4]
        .iter()
        .map(|p| serde_json::from_str(p).expect("chunk is JSON"))
        .collect();

    for chunk in &chunks {
        assert_eq!(chunk["id"], "chatcmpl-123");
        assert_eq!(chunk["object"], "chat.completion.chunk");
        assert_eq!(chunk["model"], "command-r");
        assert_eq!(chunk["choices"][0]["index"], 0);
    }

    // Empty announcement, two content deltas, stop
    assert_eq!(chunks[0]["choices"][0]["delta"], json!({}));
    assert_eq!(chunks[0]["choices"][0]["finish_reason"], Value::Null);
    assert_eq!(
        chunks[1]["choices"][0]["delta"],
        json!({ "content": "Hello" })
    );
    assert_eq!(
        chunks[2]["choices"][0]["delta"],
        json!({ "content": " world" })
    );
    assert_eq!(chunks[3]["choices"][0]["delta"], json!({}));
    assert_eq!(chunks[3]["choices"][0]["finish_reason"], "stop");

    let streamed: String = chunks
        .iter()
        .filter_map(|c| c["choices"][0]["delta"]["content"].as_str())
        .collect();
    assert_eq!(streamed, "Hello world");
}

#[tokio::test]
async fn test_streaming_forwards_mapped_request() {
    let harness = TestHarness::new().await;
    harness
        .cohere
        .mock_chat_stream(&CohereTestData::hello_world_events())
        .await;

    harness
        .server
        .post("/v1/chat/completions")
        .add_header(header::AUTHORIZATION, auth_header())
        .json(&test_data::streaming_request("command-r"))
        .await
        .assert_status_ok();

    let requests = harness.cohere.chat_requests().await;
    assert_eq!(requests.len(), 1);

    let upstream = &requests[0];
    assert_eq!(
        upstream.headers.get("authorization").unwrap(),
        format!("Bearer {}", TEST_COHERE_KEY).as_str()
    );
    assert_eq!(upstream.headers.get("accept").unwrap(), "application/json");
    assert_eq!(
        upstream.headers.get("content-type").unwrap(),
        "application/json"
    );

    let body: Value = serde_json::from_slice(&upstream.body).unwrap();
    assert_eq!(
        body,
        json!({
            "model": "command-r",
            "chat_history": [
                { "role": "SYSTEM", "message": "You are terse." },
                { "role": "USER", "message": "Hi" },
                { "role": "CHATBOT", "message": "Hello." }
            ],
            "message": "Say hello world",
            "stream": true,
            "max_tokens": 4000
        })
    );
}

#[tokio::test]
async fn test_streaming_unknown_model_is_rewritten() {
    let harness = TestHarness::new().await;
    harness
        .cohere
        .mock_chat_stream(&CohereTestData::hello_world_events())
        .await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .add_header(header::AUTHORIZATION, auth_header())
        .json(&test_data::streaming_request("gpt-4"))
        .await;

    response.assert_status_ok();

    let forwarded = harness.forwarded_bodies().await;
    assert_eq!(forwarded[0]["model"], "command-r-plus");
    assert_eq!(forwarded[0]["max_tokens"], 4000);

    // Chunks echo the rewritten model
    let payloads = sse_payloads(&response.text());
    let first: Value = serde_json::from_str(&payloads[0]).unwrap();
    assert_eq!(first["model"], "command-r-plus");
}

#[tokio::test]
async fn test_streaming_truncated_upstream_ends_without_done() {
    let harness = TestHarness::new().await;
    harness
        .cohere
        .mock_chat_stream(&[
            CohereTestData::stream_start(),
            CohereTestData::text_generation("Partial"),
        ])
        .await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .add_header(header::AUTHORIZATION, auth_header())
        .json(&test_data::streaming_request("command-r"))
        .await;

    response.assert_status_ok();

    let payloads = sse_payloads(&response.text());
    assert_eq!(payloads.len(), 2, "payloads: {:?}", payloads);
    assert!(payloads.iter().all(|p| p != "[DONE]"));

    let second: Value = serde_json::from_str(&payloads[1]).unwrap();
    assert_eq!(second["choices"][0]["delta"]["content"], "Partial");
}

#[tokio::test]
async fn test_streaming_ignores_events_after_finish() {
    let harness = TestHarness::new().await;
    let mut events = CohereTestData::hello_world_events();
    events.push(CohereTestData::text_generation("late"));
    harness.cohere.mock_chat_stream(&events).await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .add_header(header::AUTHORIZATION, auth_header())
        .json(&test_data::streaming_request("command-r"))
        .await;

    let payloads = sse_payloads(&response.text());
    assert_eq!(payloads.len(), 5);
    assert_eq!(payloads.last().unwrap(), "[DONE]");
    assert!(!response.text().contains("late"));
}

#[tokio::test]
async fn test_streaming_handles_pretty_printed_events() {
    let harness = TestHarness::new().await;
    // No newline delimiters and objects spread across lines
    let body = concat!(
        "{\"is_finished\": false, \"event_type\": \"stream-start\"}",
        "{\n  \"is_finished\": false,\n  \"event_type\": \"text-generation\",\n  \"text\": \"Hi\"\n}",
        "{\"is_finished\": true, \"event_type\": \"stream-end\", \"finish_reason\": \"COMPLETE\"}"
    );
    harness.cohere.mock_chat_stream_raw(body).await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .add_header(header::AUTHORIZATION, auth_header())
        .json(&test_data::streaming_request("command-r"))
        .await;

    let payloads = sse_payloads(&response.text());
    assert_eq!(payloads.len(), 4, "payloads: {:?}", payloads);
    let content: Value = serde_json::from_str(&payloads[1]).unwrap();
    assert_eq!(content["choices"][0]["delta"]["content"], "Hi");
    assert_eq!(payloads[3], "[DONE]");
}

// ============================================================================
// Non-streaming
// ============================================================================

#[tokio::test]
async fn test_non_streaming_returns_completion_document() {
    let harness = TestHarness::new().await;
    harness
        .cohere
        .mock_chat_document(CohereTestData::document("I am fine.", 7, 4))
        .await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .add_header(header::AUTHORIZATION, auth_header())
        .json(&test_data::non_streaming_request("command"))
        .await;

    response.assert_status_ok();
    assert!(content_type(&response).starts_with("application/json"));

    let body: Value = response.json();
    assert_eq!(body["id"], "chatcmpl-123");
    assert_eq!(body["object"], "chat.completion");
    assert_eq!(body["model"], "command");
    assert!(body["created"].as_i64().unwrap() > 0);
    assert_eq!(body["choices"][0]["index"], 0);
    assert_eq!(body["choices"][0]["message"]["role"], "assistant");
    assert_eq!(body["choices"][0]["message"]["content"], "I am fine.");
    assert_eq!(body["choices"][0]["finish_reason"], "stop");
    assert_eq!(
        body["usage"],
        json!({ "prompt_tokens": 7, "completion_tokens": 4, "total_tokens": 11 })
    );

    let forwarded = harness.forwarded_bodies().await;
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0]["stream"], false);
    assert_eq!(forwarded[0]["message"], "Hello, how are you?");
    assert_eq!(forwarded[0]["chat_history"], json!([]));
}

#[tokio::test]
async fn test_non_streaming_undecodable_document_is_server_error() {
    let harness = TestHarness::new().await;
    harness
        .cohere
        .mock_chat_document(json!({ "text": 42 }))
        .await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .add_header(header::AUTHORIZATION, auth_header())
        .json(&test_data::non_streaming_request("command-r"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_upstream_error_status_is_server_error() {
    let harness = TestHarness::new().await;
    harness.cohere.mock_chat_error(401, "invalid api token").await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .add_header(header::AUTHORIZATION, auth_header())
        .json(&test_data::streaming_request("command-r"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("401"));
}

#[tokio::test]
async fn test_unreachable_upstream_is_server_error() {
    let server = test_server(test_config("http://127.0.0.1:1", false));

    let response = server
        .post("/v1/chat/completions")
        .add_header(header::AUTHORIZATION, auth_header())
        .json(&test_data::non_streaming_request("command-r"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_missing_authorization_is_rejected_without_upstream_call() {
    let harness = TestHarness::new().await;
    harness
        .cohere
        .mock_chat_stream(&CohereTestData::hello_world_events())
        .await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .json(&test_data::streaming_request("command-r"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid Authorization header format");
    assert!(harness.cohere.chat_requests().await.is_empty());
}

#[tokio::test]
async fn test_non_bearer_authorization_is_rejected() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"))
        .json(&test_data::streaming_request("command-r"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(harness.cohere.chat_requests().await.is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .add_header(header::AUTHORIZATION, auth_header())
        .add_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .bytes("{not json".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
    assert!(harness.cohere.chat_requests().await.is_empty());
}

#[tokio::test]
async fn test_missing_messages_is_rejected() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .add_header(header::AUTHORIZATION, auth_header())
        .json(&test_data::request_without_messages())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stream_only_mode_rejects_non_streaming() {
    let harness = TestHarness::with_stream_only(true).await;
    harness
        .cohere
        .mock_chat_stream(&CohereTestData::hello_world_events())
        .await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .add_header(header::AUTHORIZATION, auth_header())
        .json(&test_data::non_streaming_request("command-r"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Stream is not enabled");
    assert!(harness.cohere.chat_requests().await.is_empty());

    // Streaming still goes through
    harness
        .server
        .post("/v1/chat/completions")
        .add_header(header::AUTHORIZATION, auth_header())
        .json(&test_data::streaming_request("command-r"))
        .await
        .assert_status_ok();
}
