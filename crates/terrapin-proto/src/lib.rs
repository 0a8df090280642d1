//! wire messages exchanged between the terrapin controller and its agents.
//!
//! every outbound message is a full snapshot of the recipient's view,
//! delivered at-most-once over the agent's duplex channel. field names are
//! the json wire contract and must not change shape.

#![warn(missing_docs)]

mod auth_proxy;
mod dns_authority;
mod health;
mod message;
mod sync;

pub use auth_proxy::{AuthConfig, AuthProxyConfig, ResourceAuthConfig};
pub use dns_authority::{
    DnsAuthorityAction, DnsAuthorityRemove, DnsAuthorityUpdate, ZoneConfig, ZoneRemove, ZoneTarget,
};
pub use health::{HealthCheckStatusReport, TargetStatusReport};
pub use message::{
    AgentMessage, HEALTHCHECK_STATUS, NEWT_AUTH_PROXY_CONFIG, NEWT_DNS_AUTHORITY_CONFIG,
    OLM_DNS_AUTHORITY_CONFIG, OLM_SYNC,
};
pub use sync::{ExitNodeConfig, OlmSyncPayload, SiteConfig};
