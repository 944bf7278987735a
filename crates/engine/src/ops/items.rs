use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Item, NewItemCmd, Page, ResultEngine, UpdateItemCmd, items, trades,
    util::{normalize_optional_text, normalize_required_name, validate_price},
};

use super::{Engine, access::ensure_self, with_tx};

impl Engine {
    /// Lists a new, available item for its owner.
    pub async fn create_item(&self, cmd: NewItemCmd) -> ResultEngine<Item> {
        ensure_self(cmd.acting_user_id, cmd.owner_id, "create items")?;
        let name = normalize_required_name(&cmd.name, "item name")?;
        validate_price(cmd.price)?;

        let item = Item {
            id: Uuid::new_v4(),
            name,
            description: normalize_optional_text(cmd.description.as_deref()),
            price: cmd.price,
            is_available: true,
            owner_id: cmd.owner_id,
            created_at: Utc::now(),
        };

        with_tx!(write self, |db_tx| {
            self.require_user(&db_tx, cmd.owner_id).await?;
            let model = items::ActiveModel::from(&item).insert(&db_tx).await?;
            let item = Item::try_from(model)?;
            tracing::info!(item_id = %item.id, owner_id = %item.owner_id, "item listed");
            Ok(item)
        })
    }

    /// Return an item snapshot from DB.
    pub async fn item(&self, item_id: Uuid) -> ResultEngine<Item> {
        with_tx!(self, |db_tx| {
            let model = self.require_item(&db_tx, item_id).await?;
            Item::try_from(model)
        })
    }

    /// Lists every item, oldest first.
    pub async fn items(&self, page: Page) -> ResultEngine<Vec<Item>> {
        with_tx!(self, |db_tx| {
            let models = items::Entity::find()
                .order_by_asc(items::Column::CreatedAt)
                .order_by_asc(items::Column::Id)
                .offset(page.offset)
                .limit(page.limit)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Item::try_from).collect()
        })
    }

    /// Lists the items currently owned by `owner_id`.
    ///
    /// Fails with `KeyNotFound` when the user does not exist.
    pub async fn items_by_owner(&self, owner_id: Uuid) -> ResultEngine<Vec<Item>> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, owner_id).await?;
            let models = items::Entity::find()
                .filter(items::Column::OwnerId.eq(owner_id.to_string()))
                .order_by_asc(items::Column::CreatedAt)
                .order_by_asc(items::Column::Id)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Item::try_from).collect()
        })
    }

    /// Items owned by any of `owner_ids`, in one query. Unknown ids are
    /// simply absent from the result.
    pub async fn items_by_owners(&self, owner_ids: &[Uuid]) -> ResultEngine<Vec<Item>> {
        if owner_ids.is_empty() {
            return Ok(Vec::new());
        }
        let owner_ids: Vec<String> = owner_ids.iter().map(Uuid::to_string).collect();
        with_tx!(self, |db_tx| {
            let models = items::Entity::find()
                .filter(items::Column::OwnerId.is_in(owner_ids))
                .order_by_asc(items::Column::CreatedAt)
                .order_by_asc(items::Column::Id)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Item::try_from).collect()
        })
    }

    /// Edits name, description or price of an item the caller owns.
    pub async fn update_item(&self, cmd: UpdateItemCmd) -> ResultEngine<Item> {
        let name = cmd
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "item name"))
            .transpose()?;
        if let Some(price) = cmd.price {
            validate_price(price)?;
        }

        with_tx!(write self, |db_tx| {
            let model = self
                .require_item_owner(&db_tx, cmd.item_id, cmd.acting_user_id)
                .await?;

            let mut active: items::ActiveModel = model.clone().into();
            if let Some(name) = name {
                active.set_name(name);
            }
            if let Some(description) = cmd.description {
                active.set_description(normalize_optional_text(description.as_deref()));
            }
            if let Some(price) = cmd.price {
                active.price_minor = ActiveValue::Set(price.map(|price| price.cents()));
            }
            let model = if active.is_changed() {
                active.update(&db_tx).await?
            } else {
                model
            };
            Item::try_from(model)
        })
    }

    /// Removes an item the caller owns, together with the trades naming it.
    ///
    /// Returns the item as it was just before deletion.
    pub async fn delete_item(&self, item_id: Uuid, acting_user_id: Uuid) -> ResultEngine<Item> {
        with_tx!(write self, |db_tx| {
            let model = self
                .require_item_owner(&db_tx, item_id, acting_user_id)
                .await?;
            let item = Item::try_from(model)?;
            let item_id_str = item_id.to_string();

            let trades_removed = trades::Entity::delete_many()
                .filter(
                    Condition::any()
                        .add(trades::Column::ProposerItemId.eq(item_id_str.clone()))
                        .add(trades::Column::ResponderItemId.eq(item_id_str.clone())),
                )
                .exec(&db_tx)
                .await?
                .rows_affected;
            items::Entity::delete_by_id(item_id_str).exec(&db_tx).await?;

            tracing::info!(%item_id, trades_removed, "item deleted");
            Ok(item)
        })
    }
}
