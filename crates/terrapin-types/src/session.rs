//! user sessions, consumed read-only by the session validator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// an authenticated browser session created by the auth flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// opaque session identifier.
    pub session_id: String,
    /// bearer token presented by clients.
    pub session_token: String,
    /// the user this session belongs to.
    pub user_id: UserId,
    /// when the session stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// whether the session is still valid at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// a platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// opaque user identifier.
    pub user_id: UserId,
    /// contact e-mail, when known.
    pub email: Option<String>,
}
