//! agent sync: rebuild and push an agent's full view on (re)connect.
//!
//! push failures are logged and swallowed; a lost bootstrap is recovered
//! by the agent's next reconnect.

use std::collections::HashMap;

use terrapin_db::{Database, TerrapinDb};
use terrapin_proto::{AgentMessage, ExitNodeConfig, OLM_SYNC, OlmSyncPayload, SiteConfig};
use terrapin_types::{Config, ExitNodeId, NewtId, OlmId, Site, SiteId};
use tracing::{debug, info, warn};

use crate::bus::{AgentAddr, AgentBus, AgentKind};
use crate::reconciler::{AuthProxyReconciler, DnsAuthorityReconciler};

/// rebuilds agent views on (re)connect.
#[derive(Clone)]
pub struct SyncService {
    db: TerrapinDb,
    bus: AgentBus,
    config: Config,
    dns: DnsAuthorityReconciler,
    auth_proxy: AuthProxyReconciler,
}

impl SyncService {
    /// create a sync service over the given store, bus and reconcilers.
    pub fn new(
        db: TerrapinDb,
        bus: AgentBus,
        config: Config,
        dns: DnsAuthorityReconciler,
        auth_proxy: AuthProxyReconciler,
    ) -> Self {
        Self {
            db,
            bus,
            config,
            dns,
            auth_proxy,
        }
    }

    /// connect-hook entry point: dispatch on the agent kind.
    pub async fn handle_connect(&self, addr: AgentAddr) {
        match addr.kind {
            AgentKind::Olm => self.bootstrap_olm(&OlmId::from(addr.id.as_str())).await,
            AgentKind::Newt => self.bootstrap_newt(&NewtId::from(addr.id.as_str())).await,
        }
    }

    /// push an olm's full view: the sync payload first, then the zones its
    /// clients' sites should serve.
    async fn bootstrap_olm(&self, olm_id: &OlmId) {
        let clients = match self.db.list_clients_for_olm(olm_id).await {
            Ok(clients) => clients,
            Err(e) => {
                warn!(olm = %olm_id, error = %e, "olm bootstrap aborted: client lookup failed");
                return;
            }
        };
        if clients.is_empty() {
            debug!(olm = %olm_id, "olm has no clients, nothing to sync");
            return;
        }

        match self.build_olm_sync(&clients).await {
            Ok(payload) if payload.sites.is_empty() => {
                debug!(olm = %olm_id, "olm has no site associations, nothing to sync");
                return;
            }
            Ok(payload) => match AgentMessage::new(OLM_SYNC, &payload) {
                Ok(msg) => {
                    self.bus.send(&AgentAddr::olm(olm_id.as_str()), msg).await;
                    info!(
                        olm = %olm_id,
                        sites = payload.sites.len(),
                        exit_nodes = payload.exit_nodes.len(),
                        "sent olm sync"
                    );
                }
                Err(e) => warn!(olm = %olm_id, error = %e, "failed to encode olm sync"),
            },
            Err(e) => {
                warn!(olm = %olm_id, error = %e, "olm sync build failed, agent will resync");
                return;
            }
        }

        for client in &clients {
            if let Err(e) = self
                .dns
                .send_dns_authority_zones_to_olm(olm_id, client.client_id)
                .await
            {
                warn!(olm = %olm_id, client = %client.client_id, error = %e,
                    "zone bootstrap failed, agent will resync");
            }
        }
    }

    /// push a newt's site view: the auth-proxy config and the zones of
    /// dns-authority resources served from its site.
    async fn bootstrap_newt(&self, newt_id: &NewtId) {
        let site_id = match self.db.get_newt(newt_id).await {
            Ok(Some(newt)) => match newt.site_id {
                Some(site_id) => site_id,
                None => {
                    debug!(newt = %newt_id, "newt not bound to a site, nothing to sync");
                    return;
                }
            },
            Ok(None) => {
                warn!(newt = %newt_id, "connect from unknown newt, nothing to sync");
                return;
            }
            Err(e) => {
                warn!(newt = %newt_id, error = %e, "newt bootstrap aborted: lookup failed");
                return;
            }
        };

        if let Err(e) = self.auth_proxy.update_auth_proxy_for_site(site_id).await {
            warn!(newt = %newt_id, site = %site_id, error = %e,
                "auth proxy bootstrap failed, agent will resync");
        }

        match self.dns.zones_for_sites(&[site_id]).await {
            Ok(zones) if !zones.is_empty() => {
                let count = zones.len();
                let payload = terrapin_proto::DnsAuthorityUpdate::new(zones);
                match AgentMessage::new(terrapin_proto::NEWT_DNS_AUTHORITY_CONFIG, &payload) {
                    Ok(msg) => {
                        self.bus.send(&AgentAddr::newt(newt_id.as_str()), msg).await;
                        info!(newt = %newt_id, site = %site_id, zones = count, "sent zone bootstrap to newt");
                    }
                    Err(e) => warn!(newt = %newt_id, error = %e, "failed to encode zone bootstrap"),
                }
            }
            Ok(_) => debug!(newt = %newt_id, site = %site_id, "no zones for newt bootstrap"),
            Err(e) => warn!(newt = %newt_id, site = %site_id, error = %e,
                "zone bootstrap failed, agent will resync"),
        }
    }

    /// assemble the olm sync payload: the distinct sites its clients peer
    /// with and the distinct exit nodes across those sites.
    async fn build_olm_sync(
        &self,
        clients: &[terrapin_types::Client],
    ) -> terrapin_db::Result<OlmSyncPayload> {
        let mut sites: HashMap<SiteId, Site> = HashMap::new();
        for client in clients {
            for site_id in self.db.list_site_ids_for_client(client.client_id).await? {
                if sites.contains_key(&site_id) {
                    continue;
                }
                if let Some(site) = self.db.get_site(site_id).await? {
                    sites.insert(site_id, site);
                }
            }
        }

        // group site ids under their exit node
        let mut exit_node_sites: HashMap<ExitNodeId, Vec<i64>> = HashMap::new();
        for site in sites.values() {
            if let Some(exit_node_id) = site.exit_node_id {
                exit_node_sites
                    .entry(exit_node_id)
                    .or_default()
                    .push(site.site_id.0);
            }
        }

        let mut exit_nodes = Vec::new();
        for (exit_node_id, mut site_ids) in exit_node_sites {
            let Some(node) = self.db.get_exit_node(exit_node_id).await? else {
                continue;
            };
            site_ids.sort_unstable();
            exit_nodes.push(ExitNodeConfig {
                public_key: node.public_key,
                relay_port: self.config.gerbil.clients_start_port,
                endpoint: node.endpoint,
                site_ids,
            });
        }
        exit_nodes.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));

        let mut site_configs: Vec<SiteConfig> = sites
            .values()
            .map(|site| SiteConfig {
                site_id: site.site_id.0,
                name: site.name.clone(),
                nice_id: site.nice_id.clone(),
                public_ip: site.public_ip.clone(),
                exit_node_id: site.exit_node_id.map(|id| id.0),
            })
            .collect();
        site_configs.sort_by_key(|s| s.site_id);

        Ok(OlmSyncPayload {
            sites: site_configs,
            exit_nodes,
        })
    }
}
