//! Integration tests for `ChatCompletionsClient` using wiremock HTTP mocks.

use std::time::Duration;

use chrono::Utc;
use revscope_core::{RawReview, RetryPolicy};
use revscope_report::{summarize, ChatCompletionsClient, ReportError, TextGenerator};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ChatCompletionsClient {
    ChatCompletionsClient::new(base_url, "test-key", "test-model", 5)
        .expect("failed to build test client")
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": "cmpl-1",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    }))
}

#[tokio::test]
async fn sends_model_prompt_and_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "messages": [{ "role": "user", "content": "hello" }]
        })))
        .respond_with(completion("  hi there \n"))
        .expect(1)
        .mount(&server)
        .await;

    let reply = test_client(&server.uri())
        .complete("hello")
        .await
        .expect("completion should succeed");

    assert_eq!(reply, "hi there");
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_tolerated() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&format!("{}/", server.uri()));
    assert_eq!(client.complete("x").await.expect("completion"), "ok");
}

#[tokio::test]
async fn error_status_is_a_generation_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .complete("hello")
        .await
        .expect_err("429 must fail");

    assert!(matches!(err, ReportError::Generation(_)), "unexpected: {err}");
    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn empty_choices_is_a_generation_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .complete("hello")
        .await
        .expect_err("no choices must fail");

    assert!(matches!(err, ReportError::Generation(_)));
}

#[tokio::test]
async fn summarize_retries_server_errors_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion(
            r#"{"pros":["sturdy"],"cons":["heavy"],"summary":["works well"]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let reviews = [RawReview {
        rating: Some(4.0),
        body: Some("Sturdy but heavy".to_string()),
        ..RawReview::default()
    }
    .into_review("R1".to_string(), Utc::now())];
    let client = test_client(&server.uri());

    let draft = summarize(
        Some(&client),
        &reviews,
        RetryPolicy::fixed(3, Duration::ZERO),
    )
    .await
    .expect("third attempt should succeed");

    assert_eq!(draft.pros, ["sturdy"]);
    assert_eq!(draft.cons, ["heavy"]);
}
