//! health-status ingestor.
//!
//! handles inbound `healthcheck/status` reports from newt agents: validates
//! tenancy per target, persists observed health, and triggers the dns
//! reconciler for the affected resources. per-row failures are counted and
//! never surface to the reporting agent.

use std::str::FromStr;

use serde_json::Value;
use terrapin_db::{Database, TerrapinDb};
use terrapin_proto::HealthCheckStatusReport;
use terrapin_types::{HealthStatus, NewtId, TargetId};
use tracing::{info, warn};

use crate::bus::{AgentAddr, AgentKind};
use crate::reconciler::DnsAuthorityReconciler;

/// ingestor for newt health reports.
#[derive(Clone)]
pub struct HealthIngestor {
    db: TerrapinDb,
    dns: DnsAuthorityReconciler,
}

/// outcome counters for one ingested batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    /// rows persisted.
    pub updated: usize,
    /// rows rejected: unparsable id or status, unknown target, or a
    /// tenancy mismatch.
    pub errors: usize,
}

impl HealthIngestor {
    /// create an ingestor over the given store and downstream reconciler.
    pub fn new(db: TerrapinDb, dns: DnsAuthorityReconciler) -> Self {
        Self { db, dns }
    }

    /// handle one inbound `healthcheck/status` payload.
    ///
    /// suitable for direct registration on the bus; all failures are
    /// swallowed after logging.
    pub async fn handle_report(&self, from: AgentAddr, payload: Value) {
        if from.kind != AgentKind::Newt {
            warn!(agent = %from, "health report from non-newt agent, ignoring");
            return;
        }
        let report: HealthCheckStatusReport = match serde_json::from_value(payload) {
            Ok(report) => report,
            Err(e) => {
                warn!(agent = %from, error = %e, "malformed health report, dropping");
                return;
            }
        };

        let stats = self.ingest(&NewtId::from(from.id.as_str()), &report).await;
        info!(
            agent = %from,
            updated = stats.updated,
            errors = stats.errors,
            "ingested health report"
        );
    }

    /// persist a report batch for the given newt and trigger the dns
    /// reconciler for the touched targets. returns the batch counters.
    pub async fn ingest(&self, newt_id: &NewtId, report: &HealthCheckStatusReport) -> IngestStats {
        let reporter_site = match self.db.get_newt(newt_id).await {
            Ok(Some(newt)) => match newt.site_id {
                Some(site_id) => site_id,
                None => {
                    warn!(newt = %newt_id, "health report from unbound newt, dropping");
                    return IngestStats {
                        updated: 0,
                        errors: report.targets.len(),
                    };
                }
            },
            Ok(None) => {
                warn!(newt = %newt_id, "health report from unknown newt, dropping");
                return IngestStats {
                    updated: 0,
                    errors: report.targets.len(),
                };
            }
            Err(e) => {
                warn!(newt = %newt_id, error = %e, "newt lookup failed, dropping report");
                return IngestStats::default();
            }
        };

        let mut stats = IngestStats::default();
        let mut touched = Vec::new();

        for (raw_id, target_report) in &report.targets {
            let Ok(target_id) = raw_id.parse::<i64>().map(TargetId) else {
                warn!(newt = %newt_id, target = %raw_id, "unparsable target id in health report");
                stats.errors += 1;
                continue;
            };
            let Ok(status) = HealthStatus::from_str(&target_report.status) else {
                warn!(newt = %newt_id, target = %target_id, status = %target_report.status,
                    "unknown health status in report");
                stats.errors += 1;
                continue;
            };

            // tenancy check: a newt may only mutate targets of its own site
            match self.db.get_target_with_site(target_id).await {
                Ok(Some((target, _site))) if target.site_id == reporter_site => {
                    if let Err(e) = self.db.set_target_health_status(target_id, status).await {
                        warn!(newt = %newt_id, target = %target_id, error = %e,
                            "failed to persist health status");
                        stats.errors += 1;
                        continue;
                    }
                    stats.updated += 1;
                    touched.push(target_id);
                }
                Ok(Some(_)) => {
                    warn!(newt = %newt_id, target = %target_id,
                        "health report for foreign-site target rejected");
                    stats.errors += 1;
                }
                Ok(None) => {
                    warn!(newt = %newt_id, target = %target_id,
                        "health report for unknown target rejected");
                    stats.errors += 1;
                }
                Err(e) => {
                    warn!(newt = %newt_id, target = %target_id, error = %e,
                        "target lookup failed during health ingest");
                    stats.errors += 1;
                }
            }
        }

        if !touched.is_empty() {
            if let Err(e) = self.dns.on_health_check_update(&touched).await {
                warn!(newt = %newt_id, error = %e, "dns reconciliation after health ingest failed");
            }
        }
        stats
    }
}
