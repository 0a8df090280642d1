//! exit node entity for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

use terrapin_types::{ExitNode, ExitNodeId};

/// exit node database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "exit_nodes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub exit_node_id: i64,
    pub public_key: String,
    pub endpoint: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::site::Entity")]
    Sites,
}

impl Related<super::site::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ExitNode {
    fn from(model: Model) -> Self {
        ExitNode {
            exit_node_id: ExitNodeId(model.exit_node_id),
            public_key: model.public_key,
            endpoint: model.endpoint,
        }
    }
}

impl From<&ExitNode> for ActiveModel {
    fn from(node: &ExitNode) -> Self {
        ActiveModel {
            exit_node_id: if node.exit_node_id.0 == 0 {
                NotSet
            } else {
                Set(node.exit_node_id.0)
            },
            public_key: Set(node.public_key.clone()),
            endpoint: Set(node.endpoint.clone()),
        }
    }
}
