//! inbound health reports from newt agents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// health report for one target, as sent by the probing agent.
///
/// `status` stays a plain string here; the ingestor parses and rejects
/// unknown values per row instead of failing the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetStatusReport {
    /// reported status: healthy / unhealthy / unknown.
    pub status: String,

    /// when the agent last probed the target (agent clock, iso-8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_check: Option<String>,

    /// how many probes the agent has run for this target.
    #[serde(default)]
    pub check_count: u64,

    /// last probe error, if the target is failing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,

    /// the probe configuration the agent is running. echoed for
    /// observability; the controller does not act on it.
    #[serde(default)]
    pub config: serde_json::Value,
}

/// payload of a `healthcheck/status` message.
///
/// keyed by target id rendered as a string (json object keys). a btreemap
/// keeps iteration deterministic for logging and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckStatusReport {
    /// per-target reports.
    pub targets: BTreeMap<String, TargetStatusReport>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_agent_report() {
        let report: HealthCheckStatusReport = serde_json::from_value(json!({
            "targets": {
                "7": {
                    "status": "unhealthy",
                    "lastCheck": "2026-03-01T12:00:00Z",
                    "checkCount": 12,
                    "lastError": "connect timeout",
                    "config": {"path": "/healthz"}
                },
                "8": {"status": "healthy"}
            }
        }))
        .unwrap();

        let t7 = &report.targets["7"];
        assert_eq!(t7.status, "unhealthy");
        assert_eq!(t7.check_count, 12);
        assert_eq!(t7.last_error.as_deref(), Some("connect timeout"));

        // missing optional fields default
        let t8 = &report.targets["8"];
        assert_eq!(t8.status, "healthy");
        assert_eq!(t8.check_count, 0);
        assert!(t8.last_check.is_none());
    }
}
