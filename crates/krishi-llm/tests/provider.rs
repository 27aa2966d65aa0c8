// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use krishi_config::model::LlmConfig;
use krishi_core::KrishiError;
use krishi_core::traits::ProviderAdapter;
use krishi_core::types::{ProviderMessage, ProviderRequest};
use krishi_llm::HuggingFaceProvider;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> HuggingFaceProvider {
    let config = LlmConfig {
        api_key: Some("hf_test".into()),
        ..Default::default()
    };
    HuggingFaceProvider::new(&config)
        .unwrap()
        .with_base_url(&server.uri())
}

fn request(prompt: &str) -> ProviderRequest {
    ProviderRequest {
        model: "meta-llama/Meta-Llama-3-8B-Instruct".into(),
        messages: vec![ProviderMessage::user(prompt)],
        max_tokens: 512,
        temperature: 0.7,
    }
}

#[tokio::test]
async fn completes_chat_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer hf_test"))
        .and(body_partial_json(serde_json::json!({
            "model": "meta-llama/Meta-Llama-3-8B-Instruct",
            "max_tokens": 512,
            "stream": false,
            "messages": [{"role": "user", "content": "How to grow okra?"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "meta-llama/Meta-Llama-3-8B-Instruct",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "<p>Sow in spring.</p>"}}],
            "usage": {"prompt_tokens": 42, "completion_tokens": 7, "total_tokens": 49}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server)
        .complete(request("How to grow okra?"))
        .await
        .unwrap();
    assert_eq!(response.content, "<p>Sow in spring.</p>");
    let usage = response.usage.unwrap();
    assert_eq!(usage.input_tokens, 42);
    assert_eq!(usage.output_tokens, 7);
}

#[tokio::test]
async fn error_body_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(serde_json::json!({"error": "Model is currently loading"})),
        )
        .mount(&server)
        .await;

    let err = provider(&server).complete(request("q")).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("503"), "{msg}");
    assert!(msg.contains("Model is currently loading"), "{msg}");
}

#[tokio::test]
async fn openai_style_error_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(
            serde_json::json!({"error": {"message": "Invalid credentials", "type": "auth"}}),
        ))
        .mount(&server)
        .await;

    let err = provider(&server).complete(request("q")).await.unwrap_err();
    assert!(err.to_string().contains("Invalid credentials"));
}

#[tokio::test]
async fn empty_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let err = provider(&server).complete(request("q")).await.unwrap_err();
    assert!(err.to_string().contains("no content"));
}

#[tokio::test]
async fn slow_response_is_a_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"choices": []}))
                .set_delay(std::time::Duration::from_millis(1500)),
        )
        .mount(&server)
        .await;

    let config = LlmConfig {
        api_key: Some("hf_test".into()),
        timeout_secs: 1,
        ..Default::default()
    };
    let provider = HuggingFaceProvider::new(&config)
        .unwrap()
        .with_base_url(&server.uri());

    let err = provider.complete(request("q")).await.unwrap_err();
    assert!(
        matches!(err, KrishiError::Timeout { duration } if duration.as_secs() == 1),
        "{err}"
    );
}
