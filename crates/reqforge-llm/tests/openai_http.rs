//! HTTP-level tests for the OpenAI provider against a local mock server

use reqforge_llm::{CompletionOptions, LlmError, LlmProvider, OpenAiConfig, OpenAiProvider};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer, api_key: Option<&str>) -> OpenAiProvider {
    OpenAiProvider::new(OpenAiConfig {
        base_url: format!("{}/v1", server.uri()),
        api_key: api_key.map(str::to_string),
        timeout_secs: 5,
        ..OpenAiConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn completion_returns_first_choice_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "gpt-4o", "max_tokens": 4000})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "[{\"name\": \"Login\"}]"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, Some("sk-test"));
    let options = CompletionOptions::default().with_system_prompt("You are an analyst.");
    let content = provider.complete("Extract features", &options).await.unwrap();

    assert_eq!(content, "[{\"name\": \"Login\"}]");
}

#[tokio::test]
async fn missing_key_fails_without_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = provider_for(&server, None);
    let result = provider.complete("prompt", &CompletionOptions::default()).await;

    assert_eq!(result.unwrap_err(), LlmError::AuthenticationMissing);
}

#[tokio::test]
async fn rejected_key_maps_to_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let provider = provider_for(&server, Some("sk-bad"));
    let result = provider.complete("prompt", &CompletionOptions::default()).await;

    match result {
        Err(LlmError::Authentication(message)) => assert!(message.contains("invalid api key")),
        other => panic!("expected authentication error, got {:?}", other),
    }
}

#[tokio::test]
async fn throttling_maps_to_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, Some("sk-test"));
    let result = provider.complete("prompt", &CompletionOptions::default()).await;

    assert_eq!(result.unwrap_err(), LlmError::RateLimitExceeded);
}

#[tokio::test]
async fn empty_choices_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let provider = provider_for(&server, Some("sk-test"));
    let result = provider.complete("prompt", &CompletionOptions::default()).await;

    assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
}

#[tokio::test]
async fn embedding_returns_first_vector() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(json!({"model": "text-embedding-3-small", "input": "Login. Sign in"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": [0.25, -0.5, 1.0]}]
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server, Some("sk-test"));
    let embedding = provider.embed("Login. Sign in").await.unwrap();

    assert_eq!(embedding, vec![0.25, -0.5, 1.0]);
}

#[tokio::test]
async fn server_error_maps_to_communication() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let provider = provider_for(&server, Some("sk-test"));
    let result = provider.embed("text").await;

    assert!(matches!(result, Err(LlmError::Communication(_))));
}
