//! session entity for database storage.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;

use terrapin_types::{Session, UserId};

/// session database model. created by the auth flow, read-only here.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_id: String,
    #[sea_orm(unique)]
    pub session_token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::UserId"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Session {
    fn from(model: Model) -> Self {
        Session {
            session_id: model.session_id,
            session_token: model.session_token,
            user_id: UserId(model.user_id),
            expires_at: model.expires_at,
        }
    }
}

impl From<&Session> for ActiveModel {
    fn from(session: &Session) -> Self {
        ActiveModel {
            session_id: Set(session.session_id.clone()),
            session_token: Set(session.session_token.clone()),
            user_id: Set(session.user_id.0.clone()),
            expires_at: Set(session.expires_at),
        }
    }
}
