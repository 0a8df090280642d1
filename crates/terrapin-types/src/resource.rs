//! routable resources and their upstream targets.

use serde::{Deserialize, Serialize};

use crate::{Error, OrgId, ResourceId, SiteId, TargetId};

/// default ttl for dns-authority answers, in seconds.
pub const DEFAULT_DNS_TTL: u32 = 60;

/// default target priority (lower = higher preference).
pub const DEFAULT_TARGET_PRIORITY: i32 = 100;

/// routing policy applied by agents when answering dns for a resource.
///
/// the controller never evaluates these; they are transported to agents
/// as part of the zone config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingPolicy {
    /// answer with the single lowest-priority healthy target.
    #[default]
    Failover,
    /// rotate uniformly across healthy targets per query.
    #[serde(rename = "roundrobin")]
    RoundRobin,
    /// answer with all healthy targets at the lowest priority tier.
    Priority,
}

impl RoutingPolicy {
    /// the wire representation of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingPolicy::Failover => "failover",
            RoutingPolicy::RoundRobin => "roundrobin",
            RoutingPolicy::Priority => "priority",
        }
    }
}

impl std::str::FromStr for RoutingPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "failover" => Ok(RoutingPolicy::Failover),
            "roundrobin" => Ok(RoutingPolicy::RoundRobin),
            "priority" => Ok(RoutingPolicy::Priority),
            other => Err(Error::InvalidData(format!(
                "unknown routing policy: {other}"
            ))),
        }
    }
}

/// upstream protocol for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetMethod {
    /// plain http upstream.
    #[default]
    Http,
    /// https upstream.
    Https,
    /// raw tcp upstream.
    Tcp,
    /// raw udp upstream.
    Udp,
}

impl TargetMethod {
    /// the wire representation of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetMethod::Http => "http",
            TargetMethod::Https => "https",
            TargetMethod::Tcp => "tcp",
            TargetMethod::Udp => "udp",
        }
    }
}

impl std::str::FromStr for TargetMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(TargetMethod::Http),
            "https" => Ok(TargetMethod::Https),
            "tcp" => Ok(TargetMethod::Tcp),
            "udp" => Ok(TargetMethod::Udp),
            other => Err(Error::InvalidData(format!("unknown target method: {other}"))),
        }
    }
}

/// a routable service exposed by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// numeric resource identifier.
    pub resource_id: ResourceId,
    /// owning org.
    pub org_id: OrgId,
    /// display name.
    pub name: String,
    /// fully qualified domain the resource is served under.
    pub full_domain: Option<String>,
    /// whether the proxied upstream expects tls.
    pub ssl: bool,
    /// whether the resource is an http resource (as opposed to raw tcp/udp).
    pub http: bool,
    /// whether sso gating is enabled.
    pub sso: bool,
    /// whether access is blocked outright.
    pub block_access: bool,
    /// whether the e-mail allowlist applies.
    pub email_whitelist_enabled: bool,
    /// whether the platform answers dns authoritatively for this resource.
    pub dns_authority_enabled: bool,
    /// ttl for authoritative answers, seconds (10-86400).
    pub dns_authority_ttl: u32,
    /// policy agents apply when answering for this resource.
    pub dns_authority_routing_policy: RoutingPolicy,
}

impl Resource {
    /// whether the resource carries any auth-proxy policy worth pushing.
    pub fn has_auth_policy(&self) -> bool {
        self.sso || self.block_access || self.email_whitelist_enabled
    }
}

/// an upstream (site, ip, port) that serves a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// numeric target identifier.
    pub target_id: TargetId,
    /// resource this target serves.
    pub resource_id: ResourceId,
    /// site hosting the upstream.
    pub site_id: SiteId,
    /// upstream address inside the site network.
    pub ip: String,
    /// upstream port.
    pub port: u16,
    /// upstream protocol.
    pub method: TargetMethod,
    /// whether the target is eligible for routing.
    pub enabled: bool,
    /// preference order, lower wins. defaults to 100.
    pub priority: i32,
    /// whether the upstream expects tls.
    pub ssl: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn routing_policy_round_trips_through_strings() {
        for p in [
            RoutingPolicy::Failover,
            RoutingPolicy::RoundRobin,
            RoutingPolicy::Priority,
        ] {
            assert_eq!(RoutingPolicy::from_str(p.as_str()).unwrap(), p);
        }
        assert!(RoutingPolicy::from_str("weighted").is_err());
    }

    #[test]
    fn routing_policy_serde_uses_lowercase() {
        assert_eq!(
            serde_json::to_string(&RoutingPolicy::RoundRobin).unwrap(),
            "\"roundrobin\""
        );
        let p: RoutingPolicy = serde_json::from_str("\"failover\"").unwrap();
        assert_eq!(p, RoutingPolicy::Failover);
    }

    #[test]
    fn target_method_round_trips() {
        for m in [
            TargetMethod::Http,
            TargetMethod::Https,
            TargetMethod::Tcp,
            TargetMethod::Udp,
        ] {
            assert_eq!(TargetMethod::from_str(m.as_str()).unwrap(), m);
        }
    }

    #[test]
    fn auth_policy_gate() {
        let mut r = Resource {
            resource_id: ResourceId(1),
            org_id: OrgId::from("org-1"),
            name: "svc".to_string(),
            full_domain: Some("svc.example.com".to_string()),
            ssl: true,
            http: true,
            sso: false,
            block_access: false,
            email_whitelist_enabled: false,
            dns_authority_enabled: true,
            dns_authority_ttl: DEFAULT_DNS_TTL,
            dns_authority_routing_policy: RoutingPolicy::Failover,
        };
        assert!(!r.has_auth_policy());
        r.sso = true;
        assert!(r.has_auth_policy());
        r.sso = false;
        r.email_whitelist_enabled = true;
        assert!(r.has_auth_policy());
    }
}
