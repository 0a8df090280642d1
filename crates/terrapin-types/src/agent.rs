//! edge agents and their site associations.

use serde::{Deserialize, Serialize};

use crate::{ClientId, ExitNodeId, NewtId, OlmId, SiteId};

/// the site-side tunnel/ingress agent. one-to-one or one-to-zero with a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Newt {
    /// opaque newt identifier.
    pub newt_id: NewtId,
    /// the site this newt manages, once bound.
    pub site_id: Option<SiteId>,
}

/// a local-resolver agent. associated to sites indirectly via its clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Olm {
    /// opaque olm identifier.
    pub olm_id: OlmId,
}

/// a logical client owned by an olm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// numeric client identifier.
    pub client_id: ClientId,
    /// the olm that owns this client.
    pub olm_id: OlmId,
    /// wireguard public key of the client, if registered.
    pub pub_key: Option<String>,
}

/// a relay exit node attached to sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitNode {
    /// numeric exit node identifier.
    pub exit_node_id: ExitNodeId,
    /// wireguard public key of the exit node.
    pub public_key: String,
    /// reachable endpoint of the exit node.
    pub endpoint: String,
}
