//! Adapter integration tests using WireMock
//!
//! Verifies that the Groq-backed port adapters speak the wire format and map
//! provider outcomes onto the application error taxonomy.

use std::sync::Arc;

use ai_core::{GroqClient, LlmConfig};
use application::{
    error::ApplicationError,
    ports::{ChatCompletionPort, ChatTurn, ExpressionCandidateImage, VisionPort},
};
use domain::Expression;
use infrastructure::{GroqChatAdapter, GroqVisionAdapter};
use secrecy::SecretString;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

fn client_for(base_url: &str) -> Arc<GroqClient> {
    let config = LlmConfig {
        base_url: base_url.to_string(),
        api_key: SecretString::from("test-key"),
        chat_model: "chat-model".to_string(),
        vision_model: "vision-model".to_string(),
        timeout_ms: 5_000,
        max_tokens: 100,
        temperature: 0.7,
    };
    #[allow(clippy::unwrap_used)]
    Arc::new(GroqClient::new(config).unwrap())
}

fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "model": "chat-model",
        "choices": [
            {"message": {"role": "assistant", "content": content}}
        ],
        "usage": {"prompt_tokens": 5, "completion_tokens": 7, "total_tokens": 12}
    })
}

#[tokio::test]
async fn chat_adapter_maps_reply_and_usage() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "messages": [
                {"role": "system", "content": "sys"},
                {"role": "user", "content": "old question"},
                {"role": "assistant", "content": "old answer"},
                {"role": "user", "content": "hi"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hello!")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let adapter = GroqChatAdapter::new(client_for(&mock_server.uri()));
    let history = vec![ChatTurn::user("old question"), ChatTurn::assistant("old answer")];
    let reply = adapter.send_chat("sys", "hi", &history).await.unwrap();

    assert_eq!(reply.content, "Hello!");
    assert_eq!(reply.model, "chat-model");
    assert_eq!(reply.tokens_used, Some(12));
}

#[tokio::test]
async fn chat_adapter_maps_failures_to_chat_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let adapter = GroqChatAdapter::new(client_for(&mock_server.uri()));
    let err = adapter.send_chat("sys", "hi", &[]).await.unwrap_err();
    assert!(matches!(err, ApplicationError::ChatCall(_)));
    assert!(err.is_user_visible());
}

#[tokio::test]
async fn vision_adapter_parses_a_json_verdict() {
    let mock_server = MockServer::start().await;

    let verdict = r#"{"expression": "smitten", "confidence": 0.85, "reason": "warm tone"}"#;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({"model": "vision-model"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "vision-model",
            "choices": [{"message": {"role": "assistant", "content": verdict}}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let adapter = GroqVisionAdapter::new(client_for(&mock_server.uri()));
    let candidates = vec![
        ExpressionCandidateImage {
            expression: Expression::Smitten,
            image_url: "https://img/smitten.png".to_string(),
        },
        ExpressionCandidateImage {
            expression: Expression::Excited,
            image_url: "https://img/excited.png".to_string(),
        },
    ];

    let verdict = adapter
        .analyze_expression_images("you're the best", &candidates)
        .await
        .unwrap();
    assert_eq!(verdict.expression_name, "smitten");
    assert!((verdict.confidence - 0.85).abs() < 1e-6);
    assert_eq!(verdict.reason, "warm tone");
}

#[tokio::test]
async fn vision_adapter_rejects_unparseable_output() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "vision-model",
            "choices": [{"message": {"role": "assistant", "content": "I really cannot say."}}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let adapter = GroqVisionAdapter::new(client_for(&mock_server.uri()));
    let candidates = vec![ExpressionCandidateImage {
        expression: Expression::Idle,
        image_url: "https://img/idle.png".to_string(),
    }];

    let err = adapter
        .analyze_expression_images("hello", &candidates)
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::VisionCall(_)));
    assert!(!err.is_user_visible());
}
