//! Users table and the public `User` snapshot.
//!
//! The password hash never leaves the engine: [`User`] has no field for it.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents,
    util::{fold_key, parse_uuid},
};

/// A registered account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub balance: MoneyCents,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub username: String,
    /// Case-folded username, unique.
    #[sea_orm(unique)]
    pub username_key: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub balance_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::items::Entity")]
    Items,
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn new_account(
        username: String,
        email: String,
        password_hash: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            username_key: ActiveValue::Set(fold_key(&username)),
            username: ActiveValue::Set(username),
            email: ActiveValue::Set(email),
            password_hash: ActiveValue::Set(password_hash),
            balance_minor: ActiveValue::Set(MoneyCents::STARTING_BALANCE.cents()),
            created_at: ActiveValue::Set(created_at),
        }
    }
}

impl ActiveModel {
    pub(crate) fn set_username(&mut self, username: String) {
        self.username_key = ActiveValue::Set(fold_key(&username));
        self.username = ActiveValue::Set(username);
    }
}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "user")?,
            username: model.username,
            email: model.email,
            balance: MoneyCents::new(model.balance_minor),
            created_at: model.created_at,
        })
    }
}
