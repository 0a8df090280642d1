//! integration test for the `/health` endpoint.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use terrapin::bus::AgentBus;
use tower::ServiceExt;

#[tokio::test]
async fn health_reports_pass_for_reachable_store() {
    let db = common::test_db().await;
    let app = terrapin::create_app(
        db,
        AgentBus::new(),
        common::test_config(),
        common::test_keys(),
    )
    .await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/health+json")
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "pass");
}
