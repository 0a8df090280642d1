//! error responses for the internal http surface.
//!
//! this surface refuses very little: the session validator answers
//! `{valid: false}` instead of failing, and the health endpoint carries
//! its status in the body. what remains is the agent websocket endpoint,
//! which can turn a connection away before the upgrade, and the blanket
//! 500 for a store that failed mid-request.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::warn;

/// a request the internal surface turns away.
#[derive(Debug, Error)]
pub enum ApiError {
    /// the request is malformed and cannot be acted on.
    #[error("{0}")]
    Rejected(String),

    /// the caller presented an agent identity the store does not know.
    #[error("{0}")]
    UnknownAgent(String),

    /// the state store failed while serving the request.
    #[error("store error: {0}")]
    Store(#[from] terrapin_db::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Rejected(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::UnknownAgent(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            ApiError::Store(e) => {
                // store detail goes to the log, not the wire
                warn!(error = %e, "request failed on the state store");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
            }
        }
    }
}
