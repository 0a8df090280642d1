//! resource entity for database storage.

use std::str::FromStr;

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

use terrapin_types::{OrgId, Resource, ResourceId, RoutingPolicy};

/// resource database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "resources")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub resource_id: i64,
    pub org_id: String,
    pub name: String,
    pub full_domain: Option<String>,
    pub ssl: bool,
    pub http: bool,
    pub sso: bool,
    pub block_access: bool,
    pub email_whitelist_enabled: bool,
    pub dns_authority_enabled: bool,
    /// answer ttl in seconds, 10-86400
    pub dns_authority_ttl: i32,
    /// routing policy as string: failover / roundrobin / priority
    pub dns_authority_routing_policy: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::org::Entity",
        from = "Column::OrgId",
        to = "super::org::Column::OrgId"
    )]
    Org,
    #[sea_orm(has_many = "super::target::Entity")]
    Targets,
    #[sea_orm(has_many = "super::resource_whitelist::Entity")]
    WhitelistEntries,
}

impl Related<super::org::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Org.def()
    }
}

impl Related<super::target::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Targets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Resource {
    fn from(model: Model) -> Self {
        // unknown policy strings fall back to the failover default
        let policy = RoutingPolicy::from_str(&model.dns_authority_routing_policy)
            .unwrap_or_default();
        Resource {
            resource_id: ResourceId(model.resource_id),
            org_id: OrgId(model.org_id),
            name: model.name,
            full_domain: model.full_domain,
            ssl: model.ssl,
            http: model.http,
            sso: model.sso,
            block_access: model.block_access,
            email_whitelist_enabled: model.email_whitelist_enabled,
            dns_authority_enabled: model.dns_authority_enabled,
            dns_authority_ttl: model.dns_authority_ttl as u32,
            dns_authority_routing_policy: policy,
        }
    }
}

impl From<&Resource> for ActiveModel {
    fn from(resource: &Resource) -> Self {
        ActiveModel {
            resource_id: if resource.resource_id.0 == 0 {
                NotSet
            } else {
                Set(resource.resource_id.0)
            },
            org_id: Set(resource.org_id.0.clone()),
            name: Set(resource.name.clone()),
            full_domain: Set(resource.full_domain.clone()),
            ssl: Set(resource.ssl),
            http: Set(resource.http),
            sso: Set(resource.sso),
            block_access: Set(resource.block_access),
            email_whitelist_enabled: Set(resource.email_whitelist_enabled),
            dns_authority_enabled: Set(resource.dns_authority_enabled),
            dns_authority_ttl: Set(resource.dns_authority_ttl as i32),
            dns_authority_routing_policy: Set(resource
                .dns_authority_routing_policy
                .as_str()
                .to_string()),
        }
    }
}
