use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use scec::config::ModelConfig;
use scec::error::{ExtractionError, ModelError, PipelineError};
use scec::event::output_schema;
use scec::llm::{CompletionModel, OllamaClient};
use scec::{Extractor, Pipeline};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(endpoint: &str, timeout_ms: u64) -> OllamaClient {
    let config = ModelConfig {
        endpoint_url: endpoint.to_string(),
        model_name: "mistral:latest".to_string(),
        timeout_ms,
        ..Default::default()
    };
    OllamaClient::new(&config).unwrap()
}

fn generate_reply(response: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "model": "mistral:latest",
        "created_at": "2025-06-10T09:00:01.000000Z",
        "response": response,
        "done": true
    }))
}

#[tokio::test]
async fn test_complete_sends_schema_and_returns_response() {
    let server = MockServer::start().await;
    let schema = output_schema();

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "mistral:latest",
            "stream": false,
            "format": schema.clone()
        })))
        .respond_with(generate_reply("{\"properties\": {}}"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), 5_000);
    let reply = client.complete("Lunch tomorrow", &schema).await.unwrap();
    assert_eq!(reply, "{\"properties\": {}}");
}

#[tokio::test]
async fn test_server_error_is_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), 5_000);
    let err = client.complete("x", &json!({})).await.unwrap_err();
    match err {
        ModelError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "model not loaded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unexpected_envelope_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "nope"})))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), 5_000);
    let err = client.complete("x", &json!({})).await.unwrap_err();
    assert!(matches!(err, ModelError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_slow_model_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(generate_reply("{}").set_delay(Duration::from_millis(2_000)))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), 100);
    let err = client.complete("x", &json!({})).await.unwrap_err();
    assert!(matches!(err, ModelError::Timeout { timeout_ms: 100 }));
}

#[tokio::test]
async fn test_closed_port_is_unreachable() {
    // Grab a free port, then release it so nothing listens there
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let client = client_for(&format!("http://127.0.0.1:{}", port), 2_000);
    let err = client.complete("x", &json!({})).await.unwrap_err();
    assert!(matches!(err, ModelError::Unreachable { .. }));
}

#[tokio::test]
async fn test_pipeline_against_mock_service() {
    let server = MockServer::start().await;
    let event = json!({
        "properties": {
            "UID": "lunch-1",
            "DTSTAMP": "2025-06-10T09:00:00Z",
            "DTSTART": "2025-06-11T12:00:00Z",
            "DTEND": "2025-06-11T13:00:00Z",
            "SUMMARY": "Lunch with Sam"
        }
    });
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(generate_reply(&event.to_string()))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(Extractor::new(client_for(&server.uri(), 5_000), Tz::UTC));
    let timestamp = Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).unwrap();
    let document = pipeline
        .generate_document("Lunch with Sam tomorrow at noon for one hour", timestamp)
        .await
        .unwrap();

    assert!(document.contains("UID:lunch-1\r\n"));
    assert!(document.contains("DTSTART:20250611T120000Z\r\n"));
    assert!(document.contains("DTEND:20250611T130000Z\r\n"));
    assert!(document.contains("SUMMARY:Lunch with Sam\r\n"));
}

#[tokio::test]
async fn test_pipeline_reports_unavailable_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(Extractor::new(client_for(&server.uri(), 5_000), Tz::UTC));
    let err = pipeline
        .generate_document("lunch", Utc::now())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Extraction(ExtractionError::ModelUnavailable(ModelError::Status {
            status: 503,
            ..
        }))
    ));
}
