//! reconcilers: pure transformers from relational state to per-agent
//! configuration messages.
//!
//! each reconciler rebuilds a full snapshot view from the store and hands
//! it to the bus. nothing here retries; convergence comes from re-running
//! the transformer on the next state change or agent reconnect.

mod auth_proxy;
mod dns;

pub use auth_proxy::{AuthProxyReconciler, cookie_domain_for_host, host_of_url};
pub use dns::{DnsAuthorityReconciler, TargetView, build_zone_config};

/// result type for reconciliation passes. store failures abort the pass;
/// the caller logs and moves on.
pub type ReconcileResult<T> = std::result::Result<T, terrapin_db::Error>;
