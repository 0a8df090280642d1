//! dns-authority zone configuration messages.
//!
//! sent as `newt/dns/authority/config` and `olm/dns/authority/config`. the
//! same shape goes to both agent kinds; only the recipient set differs.

use serde::{Deserialize, Serialize};
use terrapin_types::RoutingPolicy;

/// what the recipient should do with the attached zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DnsAuthorityAction {
    /// replace the zone state for each listed domain.
    Update,
    /// forget the listed domains.
    Remove,
    /// start serving authoritative dns.
    Start,
    /// stop serving authoritative dns.
    Stop,
}

/// one answer candidate within a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneTarget {
    /// the ip served in dns answers. always a site public ip, never the
    /// target's internal address.
    pub ip: String,
    /// preference order, lower wins.
    pub priority: i32,
    /// whether the backing target currently counts as healthy.
    pub healthy: bool,
    /// site the answer routes to.
    pub site_id: i64,
    /// display name of that site.
    pub site_name: String,
}

/// the minimum state an agent needs to answer dns for one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneConfig {
    /// whether the zone is active.
    pub enabled: bool,
    /// fully qualified domain of the zone.
    pub domain: String,
    /// answer ttl in seconds.
    pub ttl: u32,
    /// how the agent picks among targets.
    pub routing_policy: RoutingPolicy,
    /// answer candidates.
    pub targets: Vec<ZoneTarget>,
}

/// zone reference within a `remove` message. only the domain is required;
/// receivers treat any extra fields as ignorable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRemove {
    /// domain to forget.
    pub domain: String,
}

/// payload of an `update` zone push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsAuthorityUpdate {
    /// always [`DnsAuthorityAction::Update`].
    pub action: DnsAuthorityAction,
    /// full zone snapshots.
    pub zones: Vec<ZoneConfig>,
}

impl DnsAuthorityUpdate {
    /// an update carrying the given zones.
    pub fn new(zones: Vec<ZoneConfig>) -> Self {
        Self {
            action: DnsAuthorityAction::Update,
            zones,
        }
    }
}

/// payload of a `remove` zone push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsAuthorityRemove {
    /// always [`DnsAuthorityAction::Remove`].
    pub action: DnsAuthorityAction,
    /// domains to forget.
    pub zones: Vec<ZoneRemove>,
}

impl DnsAuthorityRemove {
    /// a removal for one domain.
    pub fn for_domain(domain: impl Into<String>) -> Self {
        Self {
            action: DnsAuthorityAction::Remove,
            zones: vec![ZoneRemove {
                domain: domain.into(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_zone() -> ZoneConfig {
        ZoneConfig {
            enabled: true,
            domain: "svc.example.com".to_string(),
            ttl: 60,
            routing_policy: RoutingPolicy::Failover,
            targets: vec![ZoneTarget {
                ip: "203.0.113.10".to_string(),
                priority: 100,
                healthy: true,
                site_id: 1,
                site_name: "Edge 1".to_string(),
            }],
        }
    }

    #[test]
    fn zone_config_wire_shape_is_camel_case() {
        let wire = serde_json::to_value(DnsAuthorityUpdate::new(vec![sample_zone()])).unwrap();
        assert_eq!(wire["action"], "update");
        let zone = &wire["zones"][0];
        assert_eq!(zone["domain"], "svc.example.com");
        assert_eq!(zone["ttl"], 60);
        assert_eq!(zone["routingPolicy"], "failover");
        let target = &zone["targets"][0];
        assert_eq!(target["ip"], "203.0.113.10");
        assert_eq!(target["siteId"], 1);
        assert_eq!(target["siteName"], "Edge 1");
        assert_eq!(target["healthy"], true);
        assert_eq!(target["priority"], 100);
    }

    #[test]
    fn remove_carries_only_the_domain() {
        let wire = serde_json::to_value(DnsAuthorityRemove::for_domain("svc.example.com")).unwrap();
        assert_eq!(wire["action"], "remove");
        let zone = wire["zones"][0].as_object().unwrap();
        assert_eq!(zone.len(), 1, "remove zones carry only the domain");
        assert_eq!(zone["domain"], "svc.example.com");
    }

    #[test]
    fn zone_config_round_trips() {
        let update = DnsAuthorityUpdate::new(vec![sample_zone()]);
        let text = serde_json::to_string(&update).unwrap();
        let back: DnsAuthorityUpdate = serde_json::from_str(&text).unwrap();
        assert_eq!(back, update);
    }
}
