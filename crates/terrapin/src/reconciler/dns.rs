//! dns-authority reconciler.
//!
//! derives, per resource, the zone config its agents need to answer dns
//! authoritatively, computes the recipient set, and dispatches full
//! snapshots over the bus. zone construction is a pure function of the
//! loaded state so it can be unit-tested against fixtures.

use std::collections::{HashMap, HashSet};

use terrapin_db::{Database, TerrapinDb};
use terrapin_proto::{
    AgentMessage, DnsAuthorityRemove, DnsAuthorityUpdate, NEWT_DNS_AUTHORITY_CONFIG,
    OLM_DNS_AUTHORITY_CONFIG, ZoneConfig, ZoneTarget,
};
use terrapin_types::{
    ClientId, DEFAULT_DNS_TTL, DEFAULT_TARGET_PRIORITY, NewtId, OlmId, Resource, ResourceId, Site,
    SiteId, Target, TargetHealth, TargetId,
};
use tracing::{debug, info, warn};

use super::ReconcileResult;
use crate::bus::{AgentAddr, AgentBus};

/// a target joined with its hosting site and health row, the unit of
/// state the zone builder consumes.
#[derive(Debug, Clone)]
pub struct TargetView {
    /// the target row.
    pub target: Target,
    /// the site hosting it.
    pub site: Site,
    /// its health row, if present.
    pub health: Option<TargetHealth>,
}

impl TargetView {
    /// whether this target may appear in dns answers: it must be enabled
    /// and its site must qualify as an answer source.
    fn is_answer_candidate(&self) -> bool {
        self.target.enabled && self.site.is_dns_authority_source()
    }

    /// whether the target counts as healthy in answers. targets without
    /// health checking always do.
    fn is_effectively_healthy(&self) -> bool {
        match &self.health {
            Some(health) => health.effective_healthy(),
            None => true,
        }
    }
}

/// build the zone config for a resource from its joined targets.
///
/// returns `None` when the resource should not be served: dns authority
/// off, no domain, or no qualifying targets. `None` means *remove* to the
/// dispatcher.
pub fn build_zone_config(resource: &Resource, targets: &[TargetView]) -> Option<ZoneConfig> {
    if !resource.dns_authority_enabled {
        return None;
    }
    let domain = resource.full_domain.as_deref()?;

    let zone_targets: Vec<ZoneTarget> = targets
        .iter()
        .filter(|view| view.is_answer_candidate())
        .map(|view| {
            // the answer ip is the site's public ip, never the target's
            // internal address; candidacy guarantees it is set
            let ip = view.site.public_ip.clone().unwrap_or_default();
            let priority = if view.target.priority == 0 {
                DEFAULT_TARGET_PRIORITY
            } else {
                view.target.priority
            };
            ZoneTarget {
                ip,
                priority,
                healthy: view.is_effectively_healthy(),
                site_id: view.site.site_id.0,
                site_name: view.site.name.clone(),
            }
        })
        .collect();

    if zone_targets.is_empty() {
        return None;
    }

    let ttl = if resource.dns_authority_ttl == 0 {
        DEFAULT_DNS_TTL
    } else {
        resource.dns_authority_ttl
    };

    Some(ZoneConfig {
        enabled: true,
        domain: domain.to_string(),
        ttl,
        routing_policy: resource.dns_authority_routing_policy,
        targets: zone_targets,
    })
}

/// reconciler for authoritative-dns fan-out.
#[derive(Clone)]
pub struct DnsAuthorityReconciler {
    db: TerrapinDb,
    bus: AgentBus,
}

impl DnsAuthorityReconciler {
    /// create a reconciler over the given store and bus.
    pub fn new(db: TerrapinDb, bus: AgentBus) -> Self {
        Self { db, bus }
    }

    /// rebuild the zone for a resource and dispatch it to every affected
    /// agent. idempotent: unchanged state produces identical messages.
    pub async fn update_dns_authority_for_resource(
        &self,
        resource_id: ResourceId,
    ) -> ReconcileResult<()> {
        let Some(resource) = self.db.get_resource(resource_id).await? else {
            debug!(resource = %resource_id, "dns update for missing resource, nothing to do");
            return Ok(());
        };

        let views = self.load_target_views(resource_id).await?;
        let zone = build_zone_config(&resource, &views);
        let (newts, olms) = self.recipients_for_views(&views).await?;

        match zone {
            Some(zone) => {
                let domain = zone.domain.clone();
                let payload = DnsAuthorityUpdate::new(vec![zone]);
                let sent = self.dispatch_to_recipients(&payload, &newts, &olms).await;
                info!(
                    resource = %resource_id,
                    domain = %domain,
                    newts = newts.len(),
                    olms = olms.len(),
                    sent,
                    "dispatched dns authority update"
                );
            }
            None => {
                // without a domain there is nothing the agents could
                // forget; with one, tell the last-known recipients
                let Some(domain) = resource.full_domain.as_deref() else {
                    return Ok(());
                };
                let payload = DnsAuthorityRemove::for_domain(domain);
                let sent = self.dispatch_to_recipients(&payload, &newts, &olms).await;
                info!(
                    resource = %resource_id,
                    domain = %domain,
                    newts = newts.len(),
                    olms = olms.len(),
                    sent,
                    "dispatched dns authority removal"
                );
            }
        }
        Ok(())
    }

    /// bootstrap one olm with every zone its client's sites should serve.
    /// used on olm (re)connect.
    pub async fn send_dns_authority_zones_to_olm(
        &self,
        olm_id: &OlmId,
        client_id: ClientId,
    ) -> ReconcileResult<()> {
        let site_ids = self.db.list_site_ids_for_client(client_id).await?;
        let zones = self.zones_for_sites(&site_ids).await?;
        if zones.is_empty() {
            debug!(olm = %olm_id, client = %client_id, "no zones for olm bootstrap");
            return Ok(());
        }

        let count = zones.len();
        let payload = DnsAuthorityUpdate::new(zones);
        let addr = AgentAddr::olm(olm_id.as_str());
        match AgentMessage::new(OLM_DNS_AUTHORITY_CONFIG, &payload) {
            Ok(msg) => {
                self.bus.send(&addr, msg).await;
            }
            Err(e) => warn!(olm = %olm_id, error = %e, "failed to encode zone bootstrap"),
        }
        info!(olm = %olm_id, client = %client_id, zones = count, "sent zone bootstrap to olm");
        Ok(())
    }

    /// react to a batch of health transitions: collapse the targets to the
    /// distinct dns-authority resources they serve and rebuild each once.
    pub async fn on_health_check_update(&self, target_ids: &[TargetId]) -> ReconcileResult<()> {
        let resource_ids = self.db.list_resource_ids_for_targets(target_ids).await?;
        for resource_id in resource_ids {
            let Some(resource) = self.db.get_resource(resource_id).await? else {
                continue;
            };
            if !resource.dns_authority_enabled {
                continue;
            }
            self.update_dns_authority_for_resource(resource_id).await?;
        }
        Ok(())
    }

    /// all zones served from any of the given sites: the distinct
    /// dns-authority resources with an enabled target on one of them.
    /// non-qualifying sites serve nothing and contribute nothing.
    pub async fn zones_for_sites(&self, site_ids: &[SiteId]) -> ReconcileResult<Vec<ZoneConfig>> {
        let mut seen_resources = HashSet::new();
        let mut zones = Vec::new();

        for &site_id in site_ids {
            match self.db.get_site(site_id).await? {
                Some(site) if site.is_dns_authority_source() => {}
                _ => continue,
            }
            let joined = self
                .db
                .list_enabled_targets_with_resources_for_site(site_id)
                .await?;
            for (_, resource) in joined {
                if !resource.dns_authority_enabled {
                    continue;
                }
                if !seen_resources.insert(resource.resource_id) {
                    continue;
                }
                let views = self.load_target_views(resource.resource_id).await?;
                if let Some(zone) = build_zone_config(&resource, &views) {
                    zones.push(zone);
                }
            }
        }
        Ok(zones)
    }

    /// load every target of a resource joined with site and health.
    async fn load_target_views(&self, resource_id: ResourceId) -> ReconcileResult<Vec<TargetView>> {
        let targets = self.db.list_targets_for_resource(resource_id).await?;

        let mut sites: HashMap<SiteId, Site> = HashMap::new();
        let mut views = Vec::with_capacity(targets.len());
        for target in targets {
            let site = match sites.get(&target.site_id) {
                Some(site) => site.clone(),
                None => {
                    let Some(site) = self.db.get_site(target.site_id).await? else {
                        continue;
                    };
                    sites.insert(target.site_id, site.clone());
                    site
                }
            };
            let health = self.db.get_target_health(target.target_id).await?;
            views.push(TargetView {
                target,
                site,
                health,
            });
        }
        Ok(views)
    }

    /// recipient sets for a resource's views: newts on qualifying sites
    /// that host an enabled target, and olms whose clients associate with
    /// any of those sites.
    ///
    /// any client association counts, online or not; the association rows
    /// are walked per distinct site id.
    async fn recipients_for_views(
        &self,
        views: &[TargetView],
    ) -> ReconcileResult<(Vec<NewtId>, Vec<OlmId>)> {
        let mut site_ids: Vec<SiteId> = Vec::new();
        for view in views {
            if view.is_answer_candidate() && !site_ids.contains(&view.site.site_id) {
                site_ids.push(view.site.site_id);
            }
        }

        let mut newts = Vec::new();
        let mut olm_set = HashSet::new();
        let mut olms = Vec::new();

        for &site_id in &site_ids {
            if let Some(newt) = self.db.get_newt_for_site(site_id).await? {
                newts.push(newt.newt_id);
            }
            for client_id in self.db.list_client_ids_for_site(site_id).await? {
                let Some(client) = self.db.get_client(client_id).await? else {
                    continue;
                };
                if olm_set.insert(client.olm_id.clone()) {
                    olms.push(client.olm_id);
                }
            }
        }
        Ok((newts, olms))
    }

    /// send a payload to every recipient, returning how many enqueues
    /// succeeded. drops are logged by the bus and recovered by resync.
    async fn dispatch_to_recipients<T: serde::Serialize>(
        &self,
        payload: &T,
        newts: &[NewtId],
        olms: &[OlmId],
    ) -> usize {
        let mut sent = 0;
        for newt_id in newts {
            let Ok(msg) = AgentMessage::new(NEWT_DNS_AUTHORITY_CONFIG, payload) else {
                continue;
            };
            if self.bus.send(&AgentAddr::newt(newt_id.as_str()), msg).await
                == crate::bus::SendOutcome::Sent
            {
                sent += 1;
            }
        }
        for olm_id in olms {
            let Ok(msg) = AgentMessage::new(OLM_DNS_AUTHORITY_CONFIG, payload) else {
                continue;
            };
            if self.bus.send(&AgentAddr::olm(olm_id.as_str()), msg).await
                == crate::bus::SendOutcome::Sent
            {
                sent += 1;
            }
        }
        sent
    }
}
