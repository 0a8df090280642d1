//! target entity for database storage.

use std::str::FromStr;

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

use terrapin_types::{ResourceId, SiteId, Target, TargetId, TargetMethod};

/// target database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "targets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub target_id: i64,
    pub resource_id: i64,
    pub site_id: i64,
    /// upstream address inside the site network
    pub ip: String,
    pub port: i32,
    /// upstream protocol as string: http / https / tcp / udp
    pub method: String,
    pub enabled: bool,
    /// preference order, lower wins
    pub priority: i32,
    pub ssl: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::resource::Entity",
        from = "Column::ResourceId",
        to = "super::resource::Column::ResourceId"
    )]
    Resource,
    #[sea_orm(
        belongs_to = "super::site::Entity",
        from = "Column::SiteId",
        to = "super::site::Column::SiteId"
    )]
    Site,
    #[sea_orm(has_one = "super::target_health::Entity")]
    Health,
}

impl Related<super::resource::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Resource.def()
    }
}

impl Related<super::site::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Site.def()
    }
}

impl Related<super::target_health::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Health.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Target {
    fn from(model: Model) -> Self {
        Target {
            target_id: TargetId(model.target_id),
            resource_id: ResourceId(model.resource_id),
            site_id: SiteId(model.site_id),
            ip: model.ip,
            port: model.port as u16,
            method: TargetMethod::from_str(&model.method).unwrap_or_default(),
            enabled: model.enabled,
            priority: model.priority,
            ssl: model.ssl,
        }
    }
}

impl From<&Target> for ActiveModel {
    fn from(target: &Target) -> Self {
        ActiveModel {
            target_id: if target.target_id.0 == 0 {
                NotSet
            } else {
                Set(target.target_id.0)
            },
            resource_id: Set(target.resource_id.0),
            site_id: Set(target.site_id.0),
            ip: Set(target.ip.clone()),
            port: Set(i32::from(target.port)),
            method: Set(target.method.as_str().to_string()),
            enabled: Set(target.enabled),
            priority: Set(target.priority),
            ssl: Set(target.ssl),
        }
    }
}
