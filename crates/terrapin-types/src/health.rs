//! per-target health state, observed from newt agents.

use serde::{Deserialize, Serialize};

use crate::{Error, TargetId};

/// reported health of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// the target passed its last health check.
    Healthy,
    /// the target failed its last health check.
    Unhealthy,
    /// no health information yet.
    #[default]
    Unknown,
}

impl HealthStatus {
    /// the wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for HealthStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "healthy" => Ok(HealthStatus::Healthy),
            "unhealthy" => Ok(HealthStatus::Unhealthy),
            "unknown" => Ok(HealthStatus::Unknown),
            other => Err(Error::InvalidData(format!("unknown health status: {other}"))),
        }
    }
}

/// health-check knobs configured per target and executed by the site agent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HealthCheckSettings {
    /// request path probed by the agent.
    pub path: Option<String>,
    /// probe scheme (http/https).
    pub scheme: Option<String>,
    /// probe mode.
    pub mode: Option<String>,
    /// probe port, when different from the target port.
    pub port: Option<u16>,
    /// probe interval in seconds.
    pub interval: Option<u32>,
    /// probe timeout in seconds.
    pub timeout: Option<u32>,
    /// json-encoded extra request headers.
    pub headers: Option<String>,
    /// probe http method.
    pub method: Option<String>,
}

/// one-to-one health state for a target.
///
/// created with the target, mutated only by the health ingestor, destroyed
/// with the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetHealth {
    /// the target this row belongs to.
    pub target_id: TargetId,
    /// whether health checking is enabled for the target.
    pub hc_enabled: bool,
    /// last observed health.
    pub hc_health: HealthStatus,
    /// agent-side probe configuration.
    pub settings: HealthCheckSettings,
}

impl TargetHealth {
    /// a fresh health row for a newly created target.
    pub fn new(target_id: TargetId) -> Self {
        Self {
            target_id,
            hc_enabled: false,
            hc_health: HealthStatus::Unknown,
            settings: HealthCheckSettings::default(),
        }
    }

    /// whether the target should be answered as healthy.
    ///
    /// targets without health checking are always considered healthy.
    pub fn effective_healthy(&self) -> bool {
        !self.hc_enabled || self.hc_health == HealthStatus::Healthy
    }
}
