//! the typed message envelope carried over agent channels.

use serde::{Deserialize, Serialize};

/// outbound: full sync pushed to an olm on (re)connect.
pub const OLM_SYNC: &str = "olm/sync";
/// outbound: dns-authority zone configs for a newt.
pub const NEWT_DNS_AUTHORITY_CONFIG: &str = "newt/dns/authority/config";
/// outbound: dns-authority zone configs for an olm.
pub const OLM_DNS_AUTHORITY_CONFIG: &str = "olm/dns/authority/config";
/// outbound: auth-proxy config for a newt's site.
pub const NEWT_AUTH_PROXY_CONFIG: &str = "newt/auth/proxy/config";
/// inbound: periodic per-target health report from a newt.
pub const HEALTHCHECK_STATUS: &str = "healthcheck/status";

/// a message on an agent channel: a type tag plus a json payload.
///
/// wire encoding and framing belong to the connection layer; the bus and
/// the reconcilers only ever see this structured form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    /// message type, e.g. `newt/dns/authority/config`.
    #[serde(rename = "type")]
    pub msg_type: String,

    /// message payload.
    pub data: serde_json::Value,
}

impl AgentMessage {
    /// build a message from a serializable payload.
    pub fn new<T: Serialize>(msg_type: &str, data: &T) -> serde_json::Result<Self> {
        Ok(Self {
            msg_type: msg_type.to_string(),
            data: serde_json::to_value(data)?,
        })
    }
}
