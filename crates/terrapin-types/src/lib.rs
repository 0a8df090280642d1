//! core types for terrapin - the control plane of a reverse-tunnel platform.
//!
//! this crate provides the fundamental data structures used throughout terrapin:
//! - [`Site`] / [`Resource`] / [`Target`]: the relational state the reconcilers read
//! - [`Newt`] / [`Olm`] / [`Client`]: the edge agents and their associations
//! - [`Session`] / [`User`]: session-validation state
//! - [`Config`]: application configuration

#![warn(missing_docs)]

mod agent;
mod config;
mod error;
mod health;
mod ids;
mod resource;
mod session;
mod site;

pub use agent::{Client, ExitNode, Newt, Olm};
pub use config::{AppConfig, Config, DatabaseConfig, GerbilConfig, ServerConfig};
pub use error::Error;
pub use health::{HealthCheckSettings, HealthStatus, TargetHealth};
pub use ids::{ClientId, ExitNodeId, NewtId, OlmId, OrgId, ResourceId, SiteId, TargetId, UserId};
pub use resource::{
    DEFAULT_DNS_TTL, DEFAULT_TARGET_PRIORITY, Resource, RoutingPolicy, Target, TargetMethod,
};
pub use session::{Session, User};
pub use site::{Org, Site};

/// result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;
