//! Wiremock integration tests for OpenAiClient.
//!
//! These tests verify request shape and status-code mapping against mocked
//! chat completion responses.

use std::time::Duration;

use wello::prompt::{PromptBuilder, SYSTEM_PROMPT};
use wello::{CompletionParams, CompletionProvider, OpenAiClient, QueryClass, WelloError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OpenAiClient {
    OpenAiClient::with_base_url("test_key", server.uri(), Duration::from_secs(5)).unwrap()
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn test_complete_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test_key"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-3.5-turbo",
            "max_tokens": 800,
            "messages": [{ "role": "system", "content": SYSTEM_PROMPT }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("  • 뼈 건강\n\n• 햇빛  ")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let prompt = PromptBuilder::new().build("비타민D", QueryClass::Nutrient);
    let text = client(&mock_server)
        .complete(&prompt, &CompletionParams::default())
        .await
        .expect("complete should succeed");

    assert_eq!(text, "• 뼈 건강\n\n• 햇빛");
}

#[tokio::test]
async fn test_user_message_carries_instructions() {
    let mock_server = MockServer::start().await;
    let prompt = PromptBuilder::new().build("탈모", QueryClass::Symptom);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt.instructions }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client(&mock_server)
        .complete(&prompt, &CompletionParams::default())
        .await;
    assert_eq!(result.unwrap(), "ok");
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::with_base_url(
        "test_key",
        format!("{}/", mock_server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();
    let prompt = PromptBuilder::new().build("아연", QueryClass::Nutrient);
    assert!(client.complete(&prompt, &CompletionParams::default()).await.is_ok());
}

#[tokio::test]
async fn test_unauthorized_maps_to_auth_failed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&mock_server)
        .await;

    let prompt = PromptBuilder::new().build("철분", QueryClass::Nutrient);
    let err = client(&mock_server)
        .complete(&prompt, &CompletionParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, WelloError::AuthenticationFailed));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_bad_request_maps_to_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&mock_server)
        .await;

    let prompt = PromptBuilder::new().build("철분", QueryClass::Nutrient);
    let err = client(&mock_server)
        .complete(&prompt, &CompletionParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, WelloError::MalformedRequest(_)));
}

#[tokio::test]
async fn test_rate_limited_with_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&mock_server)
        .await;

    let prompt = PromptBuilder::new().build("철분", QueryClass::Nutrient);
    let err = client(&mock_server)
        .complete(&prompt, &CompletionParams::default())
        .await
        .unwrap_err();

    match err {
        WelloError::RateLimited { retry_after } => {
            assert_eq!(retry_after, Some(Duration::from_secs(7)));
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let prompt = PromptBuilder::new().build("철분", QueryClass::Nutrient);
    let err = client(&mock_server)
        .complete(&prompt, &CompletionParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, WelloError::Api { status: 503, .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("late"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let prompt = PromptBuilder::new().build("철분", QueryClass::Nutrient);
    let params = CompletionParams::new().timeout(Duration::from_millis(100));
    let err = client(&mock_server)
        .complete(&prompt, &params)
        .await
        .unwrap_err();

    assert!(matches!(err, WelloError::Timeout(_)), "got {err:?}");
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_empty_content_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("   ")))
        .mount(&mock_server)
        .await;

    let prompt = PromptBuilder::new().build("철분", QueryClass::Nutrient);
    let err = client(&mock_server)
        .complete(&prompt, &CompletionParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, WelloError::EmptyResponse));
}

#[tokio::test]
async fn test_missing_choices_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
        .mount(&mock_server)
        .await;

    let prompt = PromptBuilder::new().build("철분", QueryClass::Nutrient);
    let err = client(&mock_server)
        .complete(&prompt, &CompletionParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, WelloError::EmptyResponse));
}

#[test]
fn test_provider_name() {
    let client = OpenAiClient::new("key", Duration::from_secs(1)).unwrap();
    assert_eq!(client.name(), "openai");
}

#[tokio::test]
async fn test_unreadable_body_is_json_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let prompt = PromptBuilder::new().build("철분", QueryClass::Nutrient);
    let err = client(&mock_server)
        .complete(&prompt, &CompletionParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, WelloError::Json(_)), "got {err:?}");
    assert!(!err.is_transient());
    assert_eq!(err.cause(), wello::FailureCause::Unavailable);
}
