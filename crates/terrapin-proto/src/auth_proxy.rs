//! auth-proxy configuration pushed to newts.
//!
//! sent as `newt/auth/proxy/config`; lets a newt gate inbound requests
//! without a controller round-trip on the hot path.

use serde::{Deserialize, Serialize};

use crate::DnsAuthorityAction;

/// global authentication parameters for one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    /// whether auth gating is active.
    pub enabled: bool,
    /// public url of the controller dashboard.
    pub pangolin_url: String,
    /// spki pem the newt verifies session jwts against.
    pub jwt_public_key: String,
    /// session cookie name.
    pub cookie_name: String,
    /// domain the session cookie is scoped to.
    pub cookie_domain: String,
    /// endpoint the newt calls to validate opaque session tokens.
    pub session_validation_url: String,
}

/// per-resource auth policy within a site's config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAuthConfig {
    /// resource identifier.
    pub resource_id: i64,
    /// domain the resource is served under.
    pub domain: String,
    /// sso gating enabled.
    pub sso: bool,
    /// access blocked outright.
    pub block_access: bool,
    /// e-mail allowlist applies.
    pub email_whitelist_enabled: bool,
    /// allowlisted e-mails; empty unless the allowlist applies.
    pub allowed_emails: Vec<String>,
    /// upstream url the newt forwards to after gating.
    pub target_url: String,
    /// whether the upstream expects tls.
    pub ssl: bool,
}

/// full auth-proxy snapshot for one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthProxyConfig {
    /// always [`DnsAuthorityAction::Update`]; full snapshots only.
    pub action: DnsAuthorityAction,
    /// global auth parameters.
    pub auth: AuthConfig,
    /// per-resource policy.
    pub resources: Vec<ResourceAuthConfig>,
}

impl AuthProxyConfig {
    /// a full-snapshot update.
    pub fn update(auth: AuthConfig, resources: Vec<ResourceAuthConfig>) -> Self {
        Self {
            action: DnsAuthorityAction::Update,
            auth,
            resources,
        }
    }
}
