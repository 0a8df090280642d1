//! auth-proxy reconciler.
//!
//! builds the per-site auth-proxy snapshot (global auth parameters plus
//! per-resource policy) and pushes it to the newt managing the site, so
//! the newt can gate inbound requests without a controller round-trip.

use std::collections::HashSet;
use std::sync::Arc;

use terrapin_db::{Database, TerrapinDb};
use terrapin_proto::{
    AgentMessage, AuthConfig, AuthProxyConfig, NEWT_AUTH_PROXY_CONFIG, ResourceAuthConfig,
};
use terrapin_types::{Config, Resource, ResourceId, SiteId, Target};
use tracing::{debug, info, warn};

use super::ReconcileResult;
use crate::bus::{AgentAddr, AgentBus};
use crate::keys::JwtKeys;

/// cookie carrying the platform session token.
const SESSION_COOKIE_NAME: &str = "p_session";

/// path of the session-validation endpoint, appended to the dashboard url.
const SESSION_VALIDATE_PATH: &str = "/api/v1/auth/session/validate";

/// extract the hostname from a url, stripping scheme, path and port.
pub fn host_of_url(url: &str) -> &str {
    let without_scheme = url.split("://").nth(1).unwrap_or(url);
    let host_port = without_scheme.split('/').next().unwrap_or(without_scheme);
    host_port.split(':').next().unwrap_or(host_port)
}

/// derive the session cookie domain from a hostname: a dot plus the last
/// two labels, or the bare hostname when only one label is present.
pub fn cookie_domain_for_host(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() >= 2 {
        format!(".{}.{}", labels[labels.len() - 2], labels[labels.len() - 1])
    } else {
        host.to_string()
    }
}

/// upstream url for a target: scheme chosen by the target's tls flag.
fn target_url(target: &Target) -> String {
    let scheme = if target.ssl { "https" } else { "http" };
    format!("{}://{}:{}", scheme, target.ip, target.port)
}

/// whether a resource belongs in the auth-proxy config. dns authority is
/// required because auth-proxy only runs inside the newt-served dns
/// response path.
fn is_auth_proxied(resource: &Resource) -> bool {
    resource.dns_authority_enabled && resource.has_auth_policy()
}

/// reconciler for auth-proxy fan-out.
#[derive(Clone)]
pub struct AuthProxyReconciler {
    db: TerrapinDb,
    bus: AgentBus,
    config: Config,
    keys: Arc<JwtKeys>,
}

impl AuthProxyReconciler {
    /// create a reconciler over the given store, bus and controller
    /// identity. the config's `server.secret` rides along for future
    /// signing needs and is never emitted.
    pub fn new(db: TerrapinDb, bus: AgentBus, config: Config, keys: Arc<JwtKeys>) -> Self {
        Self {
            db,
            bus,
            config,
            keys,
        }
    }

    /// rebuild the auth-proxy config for a site and push it to the site's
    /// newt. sites with no auth-proxied resources get no message.
    pub async fn update_auth_proxy_for_site(&self, site_id: SiteId) -> ReconcileResult<()> {
        let Some(site) = self.db.get_site(site_id).await? else {
            debug!(site = %site_id, "auth proxy update for missing site, nothing to do");
            return Ok(());
        };
        if self.db.get_org(&site.org_id).await?.is_none() {
            debug!(site = %site_id, org = %site.org_id, "site org missing, nothing to do");
            return Ok(());
        }

        let mut joined = self
            .db
            .list_enabled_targets_with_resources_for_site(site_id)
            .await?;
        // one entry per resource, preferring the lowest-priority target
        joined.sort_by_key(|(target, resource)| {
            (resource.resource_id.0, target.priority, target.target_id.0)
        });

        let mut seen = HashSet::new();
        let mut resources = Vec::new();
        for (target, resource) in &joined {
            if !is_auth_proxied(resource) || !seen.insert(resource.resource_id) {
                continue;
            }
            let Some(domain) = resource.full_domain.clone() else {
                continue;
            };
            let allowed_emails = if resource.email_whitelist_enabled {
                self.db.list_whitelist_emails(resource.resource_id).await?
            } else {
                Vec::new()
            };
            resources.push(ResourceAuthConfig {
                resource_id: resource.resource_id.0,
                domain,
                sso: resource.sso,
                block_access: resource.block_access,
                email_whitelist_enabled: resource.email_whitelist_enabled,
                allowed_emails,
                target_url: target_url(target),
                ssl: resource.ssl,
            });
        }

        if resources.is_empty() {
            debug!(site = %site_id, "no auth-proxied resources on site, skipping push");
            return Ok(());
        }

        let Some(auth) = self.build_auth_config() else {
            warn!(site = %site_id, "dashboard url not configured, skipping auth proxy push");
            return Ok(());
        };

        let Some(newt) = self.db.get_newt_for_site(site_id).await? else {
            debug!(site = %site_id, "no newt bound to site, skipping auth proxy push");
            return Ok(());
        };

        let count = resources.len();
        let payload = AuthProxyConfig::update(auth, resources);
        match AgentMessage::new(NEWT_AUTH_PROXY_CONFIG, &payload) {
            Ok(msg) => {
                self.bus
                    .send(&AgentAddr::newt(newt.newt_id.as_str()), msg)
                    .await;
                info!(site = %site_id, newt = %newt.newt_id, resources = count, "pushed auth proxy config");
            }
            Err(e) => warn!(site = %site_id, error = %e, "failed to encode auth proxy config"),
        }
        Ok(())
    }

    /// rebuild the auth-proxy config of every site hosting an enabled
    /// target of the resource.
    pub async fn update_auth_proxy_for_resource(
        &self,
        resource_id: ResourceId,
    ) -> ReconcileResult<()> {
        let targets = self.db.list_targets_for_resource(resource_id).await?;
        let mut seen = HashSet::new();
        for target in targets {
            if target.enabled && seen.insert(target.site_id) {
                self.update_auth_proxy_for_site(target.site_id).await?;
            }
        }
        Ok(())
    }

    /// global auth parameters derived from the dashboard url and the
    /// controller keypair. `None` when no dashboard url is configured.
    fn build_auth_config(&self) -> Option<AuthConfig> {
        let dashboard_url = self.config.app.dashboard_url.trim_end_matches('/');
        if dashboard_url.is_empty() {
            return None;
        }
        let host = host_of_url(dashboard_url);
        Some(AuthConfig {
            enabled: true,
            pangolin_url: dashboard_url.to_string(),
            jwt_public_key: self.keys.public_key_pem().to_string(),
            cookie_name: SESSION_COOKIE_NAME.to_string(),
            cookie_domain: cookie_domain_for_host(host),
            session_validation_url: format!("{dashboard_url}{SESSION_VALIDATE_PATH}"),
        })
    }
}
