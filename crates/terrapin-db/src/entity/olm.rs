//! olm agent entity for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use terrapin_types::{Olm, OlmId};

/// olm database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "olms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub olm_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::client::Entity")]
    Clients,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Olm {
    fn from(model: Model) -> Self {
        Olm {
            olm_id: OlmId(model.olm_id),
        }
    }
}

impl From<&Olm> for ActiveModel {
    fn from(olm: &Olm) -> Self {
        ActiveModel {
            olm_id: Set(olm.olm_id.0.clone()),
        }
    }
}
