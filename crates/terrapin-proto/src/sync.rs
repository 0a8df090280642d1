//! olm bootstrap sync messages.

use serde::{Deserialize, Serialize};

/// site view included in an olm sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    /// site identifier.
    pub site_id: i64,
    /// display name.
    pub name: String,
    /// url-friendly site identifier.
    pub nice_id: String,
    /// public ip of the site, when set.
    pub public_ip: Option<String>,
    /// exit node the site relays through, when set.
    pub exit_node_id: Option<i64>,
}

/// exit node view included in an olm sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitNodeConfig {
    /// wireguard public key of the exit node.
    pub public_key: String,
    /// base relay port clients should dial.
    pub relay_port: u16,
    /// reachable endpoint of the exit node.
    pub endpoint: String,
    /// sites relayed through this exit node.
    pub site_ids: Vec<i64>,
}

/// payload of an `olm/sync` message: the olm's full site view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OlmSyncPayload {
    /// sites the olm's clients peer with.
    pub sites: Vec<SiteConfig>,
    /// distinct exit nodes across those sites.
    pub exit_nodes: Vec<ExitNodeConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_wire_shape_is_camel_case() {
        let payload = OlmSyncPayload {
            sites: vec![SiteConfig {
                site_id: 1,
                name: "Edge 1".to_string(),
                nice_id: "edge-1".to_string(),
                public_ip: Some("203.0.113.10".to_string()),
                exit_node_id: Some(9),
            }],
            exit_nodes: vec![ExitNodeConfig {
                public_key: "pubkey".to_string(),
                relay_port: 51820,
                endpoint: "relay.example.com:51820".to_string(),
                site_ids: vec![1],
            }],
        };

        let wire = serde_json::to_value(&payload).unwrap();
        assert_eq!(wire["sites"][0]["siteId"], 1);
        assert_eq!(wire["sites"][0]["publicIp"], "203.0.113.10");
        assert_eq!(wire["sites"][0]["exitNodeId"], 9);
        assert_eq!(wire["exitNodes"][0]["relayPort"], 51820);
        assert_eq!(wire["exitNodes"][0]["siteIds"], serde_json::json!([1]));
    }
}
