//! target health entity, one-to-one with targets.

use std::str::FromStr;

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use terrapin_types::{HealthCheckSettings, HealthStatus, TargetHealth, TargetId};

/// target health database model.
///
/// rows share their primary key with the owning target and are created
/// and destroyed with it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "target_health")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub target_id: i64,
    pub hc_enabled: bool,
    /// last observed health as string: healthy / unhealthy / unknown
    pub hc_health: String,
    pub hc_path: Option<String>,
    pub hc_scheme: Option<String>,
    pub hc_mode: Option<String>,
    pub hc_port: Option<i32>,
    pub hc_interval: Option<i32>,
    pub hc_timeout: Option<i32>,
    /// json-encoded extra probe headers
    pub hc_headers: Option<String>,
    pub hc_method: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::target::Entity",
        from = "Column::TargetId",
        to = "super::target::Column::TargetId"
    )]
    Target,
}

impl Related<super::target::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Target.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for TargetHealth {
    fn from(model: Model) -> Self {
        TargetHealth {
            target_id: TargetId(model.target_id),
            hc_enabled: model.hc_enabled,
            hc_health: HealthStatus::from_str(&model.hc_health).unwrap_or_default(),
            settings: HealthCheckSettings {
                path: model.hc_path,
                scheme: model.hc_scheme,
                mode: model.hc_mode,
                port: model.hc_port.map(|p| p as u16),
                interval: model.hc_interval.map(|i| i as u32),
                timeout: model.hc_timeout.map(|t| t as u32),
                headers: model.hc_headers,
                method: model.hc_method,
            },
        }
    }
}

impl From<&TargetHealth> for ActiveModel {
    fn from(health: &TargetHealth) -> Self {
        ActiveModel {
            target_id: Set(health.target_id.0),
            hc_enabled: Set(health.hc_enabled),
            hc_health: Set(health.hc_health.as_str().to_string()),
            hc_path: Set(health.settings.path.clone()),
            hc_scheme: Set(health.settings.scheme.clone()),
            hc_mode: Set(health.settings.mode.clone()),
            hc_port: Set(health.settings.port.map(i32::from)),
            hc_interval: Set(health.settings.interval.map(|i| i as i32)),
            hc_timeout: Set(health.settings.timeout.map(|t| t as i32)),
            hc_headers: Set(health.settings.headers.clone()),
            hc_method: Set(health.settings.method.clone()),
        }
    }
}
