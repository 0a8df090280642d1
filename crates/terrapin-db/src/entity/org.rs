//! org entity for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use terrapin_types::{Org, OrgId};

/// org database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orgs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub org_id: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::site::Entity")]
    Sites,
    #[sea_orm(has_many = "super::resource::Entity")]
    Resources,
}

impl Related<super::site::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sites.def()
    }
}

impl Related<super::resource::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Resources.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Org {
    fn from(model: Model) -> Self {
        Org {
            org_id: OrgId(model.org_id),
            name: model.name,
        }
    }
}

impl From<&Org> for ActiveModel {
    fn from(org: &Org) -> Self {
        ActiveModel {
            org_id: Set(org.org_id.0.clone()),
            name: Set(org.name.clone()),
        }
    }
}
