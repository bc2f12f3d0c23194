//! HTTP control surface, driven with `oneshot`.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use common::*;
use server_core::domains::artifacts::ArtifactId;
use server_core::domains::insights::parse_insight;
use server_core::kernel::MockModelGateway;

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_status_when_idle() {
    let harness = TestHarness::new(working_gateway(), vec![succeeding_strategy()]);
    let (status, body) = send(&harness.app(), "GET", "/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["run_state"], "idle");
    assert_eq!(body["iterations_attempted"], 0);
    assert_eq!(body["uptime_seconds"], 0);
}

#[tokio::test]
async fn test_double_start_conflicts() {
    let harness = TestHarness::new(
        MockModelGateway::new().unavailable(),
        vec![succeeding_strategy()],
    );
    let app = harness.app();

    let (status, body) = send(&app, "POST", "/start").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accepted"], true);
    assert_eq!(body["status"]["run_state"], "running");

    let (status, body) = send(&app, "POST", "/start").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["accepted"], false);

    let (status, body) = send(&app, "POST", "/stop").await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(body["status"]["run_state"], "running");

    harness.controller.shutdown().await;
    let (_, body) = send(&app, "GET", "/status").await;
    assert_eq!(body["run_state"], "idle");
}

#[tokio::test]
async fn test_stop_when_idle_is_ok() {
    let harness = TestHarness::new(working_gateway(), vec![succeeding_strategy()]);
    let (status, body) = send(&harness.app(), "POST", "/stop").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"]["run_state"], "idle");
}

#[tokio::test]
async fn test_insight_and_conversation_routes() {
    let harness = TestHarness::new(working_gateway(), vec![succeeding_strategy()]);
    let app = harness.app();

    let (status, body) = send(&app, "GET", "/insights").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Array(vec![]));

    let id = ArtifactId::for_link(SHARE_LINK);
    let uri_insight = format!("/insights/{}", id);
    let uri_conversation = format!("/conversations/{}", id);

    let (status, _) = send(&app, "GET", &uri_insight).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", &uri_conversation).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let store = &harness.deps.store;
    store.save_conversation(&conversation(SHARE_LINK)).unwrap();
    let record = parse_insight(INSIGHT_JSON, chrono::Utc::now()).unwrap();
    store.save_insight(&id, &record).unwrap();

    let (status, body) = send(&app, "GET", "/insights").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], id.as_str());
    assert_eq!(body[0]["filename"], id.filename());
    assert_eq!(body[0]["main_topic"], "async cancellation");
    assert_eq!(body[0]["sentiment"], "positive");

    let (status, body) = send(&app, "GET", &uri_insight).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_name"], "Sam");
    assert_eq!(body["tags"], serde_json::json!(["rust", "tokio"]));

    let (status, body) = send(&app, "GET", &uri_conversation).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source_link"], SHARE_LINK);
    assert_eq!(body["turns"][0]["role"], "user");
}

#[tokio::test]
async fn test_malformed_id_is_not_found() {
    let harness = TestHarness::new(working_gateway(), vec![succeeding_strategy()]);
    let (status, body) = send(&harness.app(), "GET", "/insights/not-an-id").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_health_reflects_model_service() {
    let healthy = TestHarness::new(working_gateway(), vec![succeeding_strategy()]);
    let (status, body) = send(&healthy.app(), "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_service"]["model"], "mock-model");

    let down = TestHarness::new(
        MockModelGateway::new().unavailable(),
        vec![succeeding_strategy()],
    );
    let (status, body) = send(&down.app(), "GET", "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert!(body["model_service"]["error"]
        .as_str()
        .unwrap()
        .contains("unavailable"));
    // Health never starts or changes the pipeline
    assert_eq!(body["pipeline"], "idle");
}

#[tokio::test]
async fn test_debug_link_does_not_persist() {
    let harness = TestHarness::new(working_gateway(), vec![succeeding_strategy()]);
    let uri = format!("/debug/test-link?url={}", SHARE_LINK);
    let (status, body) = send(&harness.app(), "GET", &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid_share_link"], true);
    assert_eq!(body["extracted"], true);
    assert_eq!(body["strategy"], "mock_static");
    assert_eq!(body["turns"].as_array().unwrap().len(), 3);
    assert!(TestHarness::json_files(&harness.conversations_dir()).is_empty());
}

#[tokio::test]
async fn test_debug_link_while_running_leaves_counters_alone() {
    let harness = TestHarness::new(working_gateway(), vec![succeeding_strategy()]);
    harness.controller.start();
    let before = harness
        .wait_for_status(Duration::from_secs(5), |s| s.iterations_attempted >= 1)
        .await;

    let uri = format!("/debug/test-link?url={}", SHARE_LINK);
    let (status, body) = send(&harness.app(), "GET", &uri).await;
    let after = harness.controller.status();
    harness.controller.shutdown().await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["extracted"], true);
    assert_eq!(after.iterations_attempted, before.iterations_attempted);
    assert_eq!(after.conversations_saved, before.conversations_saved);
    assert_eq!(after.links_generated, before.links_generated);
    assert_eq!(TestHarness::json_files(&harness.conversations_dir()).len(), 1);
}

#[tokio::test]
async fn test_debug_link_reports_failures() {
    let harness = TestHarness::new(working_gateway(), vec![failing_strategy("mock_static")]);
    let (status, body) = send(
        &harness.app(),
        "GET",
        "/debug/test-link?url=https://chatgpt.com/share/nope",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid_share_link"], false);
    assert_eq!(body["extracted"], false);
    assert_eq!(body["failures"][0]["strategy"], "mock_static");
    assert_eq!(body["failures"][0]["failure"]["kind"], "not_found");
}
