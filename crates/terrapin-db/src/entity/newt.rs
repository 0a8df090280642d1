//! newt agent entity for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use terrapin_types::{Newt, NewtId, SiteId};

/// newt database model. one-to-one or one-to-zero with a site.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "newts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub newt_id: String,
    pub site_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::site::Entity",
        from = "Column::SiteId",
        to = "super::site::Column::SiteId"
    )]
    Site,
}

impl Related<super::site::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Site.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Newt {
    fn from(model: Model) -> Self {
        Newt {
            newt_id: NewtId(model.newt_id),
            site_id: model.site_id.map(SiteId),
        }
    }
}

impl From<&Newt> for ActiveModel {
    fn from(newt: &Newt) -> Self {
        ActiveModel {
            newt_id: Set(newt.newt_id.0.clone()),
            site_id: Set(newt.site_id.map(|id| id.0)),
        }
    }
}
