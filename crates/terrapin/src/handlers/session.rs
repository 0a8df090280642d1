//! handler for the session-validation endpoint consumed by newts.
//!
//! newts call this out-of-band to verify opaque session tokens for
//! sso-protected resources. every auth outcome is a `200` with a `valid`
//! flag so the agent can distinguish "validated as unauthenticated" from
//! transport failure; only true internal faults produce a `500`.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use terrapin_db::Database;
use tracing::warn;

use crate::AppState;

/// cookie carrying the session token.
const SESSION_COOKIE: &str = "p_session";

/// response body of the validation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionValidateResponse {
    /// whether the presented token maps to a live session.
    pub valid: bool,
    /// user id, present when valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// user e-mail, present when valid and known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// session expiry as iso-8601, present when valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl SessionValidateResponse {
    fn invalid() -> Self {
        Self {
            valid: false,
            user_id: None,
            email: None,
            expires_at: None,
        }
    }
}

/// `GET /api/v1/auth/session/validate`
///
/// token source: the `p_session` cookie, else an `Authorization: Bearer`
/// header. missing, unknown, expired and orphaned tokens all validate as
/// unauthenticated.
pub async fn validate_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = extract_token(&headers) else {
        return Json(SessionValidateResponse::invalid()).into_response();
    };

    let session = match state.db.get_session_by_token(&token).await {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "session lookup failed");
            return internal_invalid();
        }
    };
    let Some(session) = session else {
        return Json(SessionValidateResponse::invalid()).into_response();
    };
    if !session.is_valid_at(Utc::now()) {
        return Json(SessionValidateResponse::invalid()).into_response();
    }

    let user = match state.db.get_user(&session.user_id).await {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, "user lookup failed");
            return internal_invalid();
        }
    };
    let Some(user) = user else {
        return Json(SessionValidateResponse::invalid()).into_response();
    };

    Json(SessionValidateResponse {
        valid: true,
        user_id: Some(user.user_id.0),
        email: user.email,
        expires_at: Some(session.expires_at.to_rfc3339()),
    })
    .into_response()
}

fn internal_invalid() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(SessionValidateResponse::invalid()),
    )
        .into_response()
}

/// pull the session token from the cookie header, else a bearer header.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = cookie_value(headers, SESSION_COOKIE) {
        return Some(token);
    }
    let auth = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    auth.strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// find a cookie by name in the `Cookie` header.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in cookies.split(';') {
        let (key, value) = pair.trim().split_once('=')?;
        if key == name && !value.is_empty() {
            return Some(value.to_string());
        }
    }
    None
}
