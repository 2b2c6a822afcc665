//! Integration tests for the model client and its two capabilities,
//! using wiremock HTTP mocks.

use chrono::NaiveDate;
use vidstats_core::QueryDescriptor;
use vidstats_nlp::{
    Classifier, LlmClassifier, LlmSynthesizer, NlpError, OpenAiClient, Synthesizer,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> OpenAiClient {
    OpenAiClient::with_base_url("test-key", "test-model", 30, base_url)
        .expect("client construction should not fail")
}

fn chat_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "test-model",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
}

#[tokio::test]
async fn complete_returns_the_assistant_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "response_format": { "type": "json_object" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("{\"ok\": true}")))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let text = client
        .complete("system prompt", "user text", true)
        .await
        .expect("should return content");

    assert_eq!(text, "{\"ok\": true}");
}

#[tokio::test]
async fn api_error_surfaces_the_api_message() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "error": {
            "message": "Incorrect API key provided",
            "type": "invalid_request_error"
        }
    });

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .complete("system", "user", false)
        .await
        .expect_err("non-success status should error");

    match err {
        NlpError::Api { status, message } => {
            assert_eq!(status, 401);
            assert!(
                message.contains("Incorrect API key"),
                "unexpected message: {message}"
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unexpected_envelope_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"odd": true})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.complete("system", "user", false).await.unwrap_err();

    assert!(matches!(err, NlpError::Deserialize { .. }), "{err:?}");
}

#[tokio::test]
async fn blank_assistant_message_is_empty_output() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("  \n")))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.complete("system", "user", false).await.unwrap_err();

    assert!(matches!(err, NlpError::EmptyOutput), "{err:?}");
}

#[tokio::test]
async fn classifier_recognizes_a_total_count_question() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "response_format": { "type": "json_object" }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_body("{\"query_type\": \"total_videos\"}")),
        )
        .mount(&server)
        .await;

    let classifier = LlmClassifier::new(test_client(&server.uri()));
    let descriptor = classifier
        .classify("Сколько всего видео есть в системе?")
        .await;

    assert_eq!(descriptor, QueryDescriptor::TotalVideos);
}

#[tokio::test]
async fn classifier_maps_a_russian_date_range_phrase() {
    let server = MockServer::start().await;

    let content = r#"{
        "query_type": "creator_videos_in_date_range",
        "creator_id": "blogger-7",
        "date_from": "2025-11-01",
        "date_to": "2025-11-05"
    }"#;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(content)))
        .mount(&server)
        .await;

    let classifier = LlmClassifier::new(test_client(&server.uri()));
    let descriptor = classifier
        .classify("Сколько видео у креатора с id blogger-7 вышло с 1 ноября 2025 по 5 ноября 2025?")
        .await;

    assert_eq!(
        descriptor,
        QueryDescriptor::CreatorVideosInDateRange {
            creator_id: "blogger-7".to_string(),
            date_from: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2025, 11, 5).unwrap(),
        }
    );
}

#[tokio::test]
async fn classifier_treats_api_failure_as_unknown() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let classifier = LlmClassifier::new(test_client(&server.uri()));
    let descriptor = classifier.classify("anything").await;

    assert_eq!(descriptor, QueryDescriptor::Unknown);
}

#[tokio::test]
async fn classifier_treats_prose_output_as_unknown() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_body("I think you want a count of videos.")),
        )
        .mount(&server)
        .await;

    let classifier = LlmClassifier::new(test_client(&server.uri()));
    let descriptor = classifier.classify("how many videos").await;

    assert_eq!(descriptor, QueryDescriptor::Unknown);
}

#[tokio::test]
async fn synthesizer_strips_the_code_fence() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_body("```sql\nSELECT COUNT(*) FROM videos\n```")),
        )
        .mount(&server)
        .await;

    let synthesizer = LlmSynthesizer::new(test_client(&server.uri()));
    let statement = synthesizer
        .synthesize("сколько записей в таблице видео")
        .await
        .expect("should synthesize");

    assert_eq!(statement, "SELECT COUNT(*) FROM videos");
}

#[tokio::test]
async fn synthesizer_rejects_an_empty_fenced_answer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("```sql\n```")))
        .mount(&server)
        .await;

    let synthesizer = LlmSynthesizer::new(test_client(&server.uri()));
    let err = synthesizer.synthesize("whatever").await.unwrap_err();

    assert!(matches!(err, NlpError::EmptyOutput), "{err:?}");
}
