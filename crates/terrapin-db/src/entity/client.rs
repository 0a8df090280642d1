//! client entity for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

use terrapin_types::{Client, ClientId, OlmId};

/// client database model. a logical client owned by an olm.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub client_id: i64,
    pub olm_id: String,
    pub pub_key: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::olm::Entity",
        from = "Column::OlmId",
        to = "super::olm::Column::OlmId"
    )]
    Olm,
    #[sea_orm(has_many = "super::client_site_association::Entity")]
    SiteAssociations,
}

impl Related<super::olm::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Olm.def()
    }
}

impl Related<super::client_site_association::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SiteAssociations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Client {
    fn from(model: Model) -> Self {
        Client {
            client_id: ClientId(model.client_id),
            olm_id: OlmId(model.olm_id),
            pub_key: model.pub_key,
        }
    }
}

impl From<&Client> for ActiveModel {
    fn from(client: &Client) -> Self {
        ActiveModel {
            client_id: if client.client_id.0 == 0 {
                NotSet
            } else {
                Set(client.client_id.0)
            },
            olm_id: Set(client.olm_id.0.clone()),
            pub_key: Set(client.pub_key.clone()),
        }
    }
}
