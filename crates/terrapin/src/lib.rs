//! terrapin library - control-plane reconciler for a reverse-tunnel platform.
//!
//! the controller hosts six cooperating components: the state store
//! (terrapin-db), the agent bus, the dns-authority and auth-proxy
//! reconcilers, the health-status ingestor, and the sync/bootstrap path
//! with its session validator and controller keypair.

pub mod bus;
pub mod cli;
pub mod handlers;
pub mod health;
pub mod keys;
pub mod reconciler;
pub mod sync;

use std::sync::Arc;

use axum::{Router, routing::get};
use terrapin_db::TerrapinDb;
use terrapin_types::Config;

use bus::AgentBus;
use health::HealthIngestor;
use keys::JwtKeys;
use reconciler::{AuthProxyReconciler, DnsAuthorityReconciler};
use sync::SyncService;

/// application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// the relational store.
    pub db: TerrapinDb,
    /// the agent message bus.
    pub bus: AgentBus,
    /// controller configuration.
    pub config: Config,
    /// the controller keypair, loaded once at startup.
    pub keys: Arc<JwtKeys>,
}

impl AppState {
    /// a dns-authority reconciler over this state.
    pub fn dns_reconciler(&self) -> DnsAuthorityReconciler {
        DnsAuthorityReconciler::new(self.db.clone(), self.bus.clone())
    }

    /// an auth-proxy reconciler over this state.
    pub fn auth_proxy_reconciler(&self) -> AuthProxyReconciler {
        AuthProxyReconciler::new(
            self.db.clone(),
            self.bus.clone(),
            self.config.clone(),
            self.keys.clone(),
        )
    }
}

/// create the axum application with all routes, and wire the inbound
/// handlers and connect hooks onto the bus.
pub async fn create_app(db: TerrapinDb, bus: AgentBus, config: Config, keys: Arc<JwtKeys>) -> Router {
    let state = AppState {
        db,
        bus,
        config,
        keys,
    };

    wire_bus(&state).await;

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/v1/auth/session/validate",
            get(handlers::validate_session),
        )
        .route("/api/v1/agent/ws", get(handlers::agent_ws))
        .with_state(state)
}

/// register the health ingestor and the reconnect sync hook on the bus.
async fn wire_bus(state: &AppState) {
    let dns = state.dns_reconciler();
    let ingestor = HealthIngestor::new(state.db.clone(), dns.clone());
    state
        .bus
        .register_handler(terrapin_proto::HEALTHCHECK_STATUS, move |from, payload| {
            let ingestor = ingestor.clone();
            async move { ingestor.handle_report(from, payload).await }
        })
        .await;

    let sync = SyncService::new(
        state.db.clone(),
        state.bus.clone(),
        state.config.clone(),
        dns,
        state.auth_proxy_reconciler(),
    );
    state
        .bus
        .on_connect(move |addr| {
            let sync = sync.clone();
            async move { sync.handle_connect(addr).await }
        })
        .await;
}
