//! Items table and the public `Item` snapshot.
//!
//! `owner_id` and `is_available` are only ever written by the ledger
//! primitives (purchase and trade acceptance); the generic update path
//! in `ops::items` cannot express them.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents,
    util::{fold_key, parse_uuid},
};

/// An item owned by exactly one user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Asking price. Items without a price are listed but cannot be bought.
    pub price: Option<MoneyCents>,
    pub is_available: bool,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Case-folded copies of `name` and `description` for search.
    pub name_key: String,
    pub description_key: Option<String>,
    pub price_minor: Option<i64>,
    pub is_available: bool,
    pub owner_id: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Item> for ActiveModel {
    fn from(item: &Item) -> Self {
        Self {
            id: ActiveValue::Set(item.id.to_string()),
            name: ActiveValue::Set(item.name.clone()),
            description: ActiveValue::Set(item.description.clone()),
            name_key: ActiveValue::Set(fold_key(&item.name)),
            description_key: ActiveValue::Set(item.description.as_deref().map(fold_key)),
            price_minor: ActiveValue::Set(item.price.map(MoneyCents::cents)),
            is_available: ActiveValue::Set(item.is_available),
            owner_id: ActiveValue::Set(item.owner_id.to_string()),
            created_at: ActiveValue::Set(item.created_at),
        }
    }
}

impl ActiveModel {
    pub(crate) fn set_name(&mut self, name: String) {
        self.name_key = ActiveValue::Set(fold_key(&name));
        self.name = ActiveValue::Set(name);
    }

    pub(crate) fn set_description(&mut self, description: Option<String>) {
        self.description_key = ActiveValue::Set(description.as_deref().map(fold_key));
        self.description = ActiveValue::Set(description);
    }
}

impl TryFrom<Model> for Item {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "item")?,
            name: model.name,
            description: model.description,
            price: model.price_minor.map(MoneyCents::new),
            is_available: model.is_available,
            owner_id: parse_uuid(&model.owner_id, "user")?,
            created_at: model.created_at,
        })
    }
}
