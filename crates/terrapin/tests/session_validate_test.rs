//! integration tests for the `/api/v1/auth/session/validate` endpoint.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use serde_json::Value;
use terrapin::bus::AgentBus;
use terrapin_db::Database;
use terrapin_types::{Session, User, UserId};
use tower::ServiceExt;

async fn app_with_session(expires_in: Duration) -> axum::Router {
    let db = common::test_db().await;
    db.create_user(&User {
        user_id: UserId::from("u1"),
        email: Some("a@x".to_string()),
    })
    .await
    .unwrap();
    db.create_session(&Session {
        session_id: "s1".to_string(),
        session_token: "abc".to_string(),
        user_id: UserId::from("u1"),
        expires_at: Utc::now() + expires_in,
    })
    .await
    .unwrap();

    terrapin::create_app(db, AgentBus::new(), common::test_config(), common::test_keys()).await
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&body).expect("body should be json")
}

/// a live session token validates with user identity and expiry.
#[tokio::test]
async fn valid_cookie_session_validates() {
    let app = app_with_session(Duration::hours(1)).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/session/validate")
                .header(header::COOKIE, "p_session=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["valid"], Value::Bool(true));
    assert_eq!(body["userId"], Value::String("u1".to_string()));
    assert_eq!(body["email"], Value::String("a@x".to_string()));
    assert!(body["expiresAt"].as_str().unwrap().contains('T'));
}

/// a wrong token is "validated as unauthenticated": 200 with valid=false.
#[tokio::test]
async fn wrong_token_returns_200_invalid() {
    let app = app_with_session(Duration::hours(1)).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/session/validate")
                .header(header::COOKIE, "p_session=wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body, serde_json::json!({"valid": false}));
}

/// no token at all is also a 200 invalid, never a 401.
#[tokio::test]
async fn missing_token_returns_200_invalid() {
    let app = app_with_session(Duration::hours(1)).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/session/validate")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["valid"], Value::Bool(false));
}

/// expired sessions validate as unauthenticated.
#[tokio::test]
async fn expired_session_is_invalid() {
    let app = app_with_session(Duration::hours(-1)).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/session/validate")
                .header(header::COOKIE, "p_session=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["valid"], Value::Bool(false));
}

/// the bearer header is accepted as a fallback token source.
#[tokio::test]
async fn bearer_header_validates() {
    let app = app_with_session(Duration::hours(1)).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/session/validate")
                .header(header::AUTHORIZATION, "Bearer abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["valid"], Value::Bool(true));
}
