//! tenant orgs and deployment sites.

use serde::{Deserialize, Serialize};

use crate::{ExitNodeId, OrgId, SiteId};

/// a tenant root; owns sites and resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Org {
    /// opaque org identifier.
    pub org_id: OrgId,
    /// display name.
    pub name: String,
}

/// a deployment location hosting one tunnel agent (newt).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// numeric site identifier.
    pub site_id: SiteId,
    /// owning org.
    pub org_id: OrgId,
    /// url-friendly identifier, unique within the org.
    pub nice_id: String,
    /// display name.
    pub name: String,
    /// agent type for this site ("newt" for tunnel sites).
    pub site_type: String,
    /// public ipv4 of the site, if known. required when dns authority is on.
    pub public_ip: Option<String>,
    /// auto-detected public ip of the server hosting the agent.
    pub server_public_ip: Option<String>,
    /// whether the site agent may talk to the local docker socket.
    pub docker_socket_enabled: bool,
    /// whether this site participates in authoritative dns fan-out.
    pub dns_authority_enabled: bool,
    /// exit node this site relays through, if any.
    pub exit_node_id: Option<ExitNodeId>,
}

impl Site {
    /// whether this site qualifies as a dns-authority answer source.
    ///
    /// a site can only appear in dns answers when dns authority is enabled
    /// and a public ip is configured.
    pub fn is_dns_authority_source(&self) -> bool {
        self.dns_authority_enabled && self.public_ip.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(dns: bool, ip: Option<&str>) -> Site {
        Site {
            site_id: SiteId(1),
            org_id: OrgId::from("org-1"),
            nice_id: "edge-1".to_string(),
            name: "Edge 1".to_string(),
            site_type: "newt".to_string(),
            public_ip: ip.map(str::to_string),
            server_public_ip: None,
            docker_socket_enabled: false,
            dns_authority_enabled: dns,
            exit_node_id: None,
        }
    }

    #[test]
    fn dns_authority_source_requires_both_flag_and_ip() {
        assert!(site(true, Some("203.0.113.10")).is_dns_authority_source());
        assert!(!site(true, None).is_dns_authority_source());
        assert!(!site(false, Some("203.0.113.10")).is_dns_authority_source());
        assert!(!site(false, None).is_dns_authority_source());
    }
}
