//! Integration tests for the validate/retry/fallback policy against a
//! mocked managed-inference backend
//!
//! Uses wiremock so the expected invocation counts (1 for a clean reply,
//! exactly 2 for retry and for fallback) are verified on the wire, not
//! just inside the client.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use recroute::client::DEFAULT_RECOMMENDATIONS;
use recroute::config::Config;
use recroute::handlers::{self, AppState};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_KEY: &str = "meta.llama3-8b-instruct-v1:0";

fn app_for(server_uri: &str) -> axum::Router {
    let toml = format!(
        r#"
[server]
host = "127.0.0.1"
port = 3000

[generation]
max_tokens = 512
temperature = 0.7

[[backends]]
model_id = "Llama3-8B"
kind = "bedrock"
model_key = "{MODEL_KEY}"
base_url = "{server_uri}"
"#
    );
    let config = Config::from_toml(&toml).expect("valid config");
    let state = AppState::new(Arc::new(config)).expect("app state");
    handlers::app(state)
}

fn complete_body() -> serde_json::Value {
    serde_json::json!({
        "model_id": "Llama3-8B",
        "tutor_id": "math-parent-tool",
        "KC": ["division-simple"],
        "chat_history": ["Hi"],
        "next_steps": ["Divide both sides"],
        "hints": "",
        "correct_step_history": [],
        "incorrect_step_history": [],
        "curr_question": "4x=20"
    })
}

async fn post_recommend(
    app: axum::Router,
    body: serde_json::Value,
    mode: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let uri = match mode {
        Some(mode) => format!("/recommend?mode={mode}"),
        None => "/recommend".to_string(),
    };
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = serde_json::from_slice(&bytes).expect("json body");
    (status, json)
}

#[tokio::test]
async fn test_well_formed_reply_needs_one_invocation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/model/{MODEL_KEY}/invoke")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "generation": "Great job # What's next? # Try again"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = post_recommend(app_for(&server.uri()), complete_body(), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["recommendations"],
        serde_json::json!(["Great job", "What's next?", "Try again"])
    );
}

#[tokio::test]
async fn test_malformed_replies_fall_back_after_exactly_two_invocations() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/model/{MODEL_KEY}/invoke")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "generation": "malformed text with no delimiter"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let (status, json) = post_recommend(app_for(&server.uri()), complete_body(), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["recommendations"],
        serde_json::json!(DEFAULT_RECOMMENDATIONS)
    );
}

#[tokio::test]
async fn test_malformed_then_valid_reply_succeeds_on_second_invocation() {
    let server = MockServer::start().await;
    // First attempt: malformed
    Mock::given(method("POST"))
        .and(path(format!("/model/{MODEL_KEY}/invoke")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "generation": "only one segment"
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    // Second attempt: well-formed
    Mock::given(method("POST"))
        .and(path(format!("/model/{MODEL_KEY}/invoke")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "generation": "one # two # three"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = post_recommend(app_for(&server.uri()), complete_body(), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["recommendations"],
        serde_json::json!(["one", "two", "three"])
    );
}

#[tokio::test]
async fn test_test_mode_returns_raw_reply_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/model/{MODEL_KEY}/invoke")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "generation": "malformed text with no delimiter"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) =
        post_recommend(app_for(&server.uri()), complete_body(), Some("test")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["recommendations"],
        serde_json::json!("malformed text with no delimiter")
    );
}

#[tokio::test]
async fn test_backend_service_error_surfaces_as_500_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/model/{MODEL_KEY}/invoke")))
        .respond_with(ResponseTemplate::new(503).set_body_string("throttled"))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = post_recommend(app_for(&server.uri()), complete_body(), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        json["error"]
            .as_str()
            .expect("error message")
            .contains("503")
    );
}

#[tokio::test]
async fn test_invoke_request_carries_generation_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/model/{MODEL_KEY}/invoke")))
        .and(body_partial_json(serde_json::json!({
            "max_gen_len": 512,
            "temperature": 0.7
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "generation": "a # b # c"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, _) = post_recommend(app_for(&server.uri()), complete_body(), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_mode_is_500() {
    let server = MockServer::start().await;
    // No mocks mounted: an invalid mode must fail before any backend call

    let (status, json) =
        post_recommend(app_for(&server.uri()), complete_body(), Some("training")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        json["error"]
            .as_str()
            .expect("error message")
            .contains("training")
    );
}
