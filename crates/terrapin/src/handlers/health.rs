//! handler for the `/health` endpoint.

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use terrapin_db::Database;

use crate::AppState;

/// health check response body, following the health+json draft convention.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// `GET /health` - verifies database connectivity.
pub async fn health(State(state): State<AppState>) -> Response {
    let (status, body) = match state.db.ping().await {
        Ok(()) => (StatusCode::OK, HealthResponse { status: "pass" }),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            HealthResponse { status: "fail" },
        ),
    };

    (
        status,
        [(header::CONTENT_TYPE, "application/health+json")],
        serde_json::to_string(&body).unwrap_or_else(|_| r#"{"status":"fail"}"#.to_string()),
    )
        .into_response()
}
