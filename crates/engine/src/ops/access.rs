use sea_orm::{DatabaseTransaction, QueryFilter, Select, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, items, trades, users, util::fold_key};

use super::Engine;

/// Generates `find_*` and `require_*` lookups by id for an entity.
macro_rules! impl_lookup_by_id {
    ($find_fn:ident, $require_fn:ident, $entity:path, $model:ty, $err_msg:literal) => {
        pub(super) async fn $find_fn(
            &self,
            db: &DatabaseTransaction,
            id: Uuid,
        ) -> ResultEngine<Option<$model>> {
            <$entity>::find_by_id(id.to_string())
                .one(db)
                .await
                .map_err(Into::into)
        }

        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            id: Uuid,
        ) -> ResultEngine<$model> {
            self.$find_fn(db, id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

/// Fails with `Forbidden` unless the caller acts on their own account.
pub(super) fn ensure_self(acting_user_id: Uuid, user_id: Uuid, action: &str) -> ResultEngine<()> {
    if acting_user_id != user_id {
        return Err(EngineError::Forbidden(format!(
            "cannot {action} for another user"
        )));
    }
    Ok(())
}

impl Engine {
    impl_lookup_by_id!(
        find_user,
        require_user,
        users::Entity,
        users::Model,
        "user not exists"
    );

    impl_lookup_by_id!(
        find_item,
        require_item,
        items::Entity,
        items::Model,
        "item not exists"
    );

    impl_lookup_by_id!(
        find_trade,
        require_trade,
        trades::Entity,
        trades::Model,
        "trade not exists"
    );

    /// Loads an item and checks that `user_id` currently owns it.
    pub(super) async fn require_item_owner(
        &self,
        db: &DatabaseTransaction,
        item_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<items::Model> {
        let model = self.require_item(db, item_id).await?;
        if model.owner_id != user_id.to_string() {
            return Err(EngineError::Forbidden(
                "item belongs to another user".to_string(),
            ));
        }
        Ok(model)
    }

    /// Enforces case-insensitive uniqueness of usernames and emails.
    ///
    /// `exclude` skips the account being updated.
    pub(super) async fn ensure_identity_free(
        &self,
        db: &DatabaseTransaction,
        username: Option<&str>,
        email: Option<&str>,
        exclude: Option<Uuid>,
    ) -> ResultEngine<()> {
        let excluded = |query: Select<users::Entity>| match exclude {
            Some(id) => query.filter(users::Column::Id.ne(id.to_string())),
            None => query,
        };

        if let Some(email) = email {
            let taken = excluded(users::Entity::find())
                .filter(users::Column::Email.eq(email.to_string()))
                .one(db)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(email.to_string()));
            }
        }

        if let Some(username) = username {
            let taken = excluded(users::Entity::find())
                .filter(users::Column::UsernameKey.eq(fold_key(username)))
                .one(db)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(username.to_string()));
            }
        }

        Ok(())
    }
}
