//! site entity for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

use terrapin_types::{ExitNodeId, OrgId, Site, SiteId};

/// site database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sites")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub site_id: i64,
    pub org_id: String,
    /// url-friendly identifier, unique within the org
    pub nice_id: String,
    pub name: String,
    /// agent type for the site ("newt" for tunnel sites)
    pub site_type: String,
    pub public_ip: Option<String>,
    pub server_public_ip: Option<String>,
    pub docker_socket_enabled: bool,
    pub dns_authority_enabled: bool,
    pub exit_node_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::org::Entity",
        from = "Column::OrgId",
        to = "super::org::Column::OrgId"
    )]
    Org,
    #[sea_orm(
        belongs_to = "super::exit_node::Entity",
        from = "Column::ExitNodeId",
        to = "super::exit_node::Column::ExitNodeId"
    )]
    ExitNode,
    #[sea_orm(has_many = "super::target::Entity")]
    Targets,
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

impl Related<super::exit_node::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExitNode.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Site {
    fn from(model: Model) -> Self {
        Site {
            site_id: SiteId(model.site_id),
            org_id: OrgId(model.org_id),
            nice_id: model.nice_id,
            name: model.name,
            site_type: model.site_type,
            public_ip: model.public_ip,
            server_public_ip: model.server_public_ip,
            docker_socket_enabled: model.docker_socket_enabled,
            dns_authority_enabled: model.dns_authority_enabled,
            exit_node_id: model.exit_node_id.map(ExitNodeId),
        }
    }
}

impl From<&Site> for ActiveModel {
    fn from(site: &Site) -> Self {
        ActiveModel {
            site_id: if site.site_id.0 == 0 {
                NotSet
            } else {
                Set(site.site_id.0)
            },
            org_id: Set(site.org_id.0.clone()),
            nice_id: Set(site.nice_id.clone()),
            name: Set(site.name.clone()),
            site_type: Set(site.site_type.clone()),
            public_ip: Set(site.public_ip.clone()),
            server_public_ip: Set(site.server_public_ip.clone()),
            docker_socket_enabled: Set(site.docker_socket_enabled),
            dns_authority_enabled: Set(site.dns_authority_enabled),
            exit_node_id: Set(site.exit_node_id.map(|id| id.0)),
        }
    }
}
