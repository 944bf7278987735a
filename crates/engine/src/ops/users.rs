use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, NewUserCmd, Page, ResultEngine, UpdateUserCmd, User, items,
    password::{hash_password, verify_password, verify_unknown_account},
    trades, users,
    util::{fold_key, normalize_email, normalize_required_name, validate_password},
};

use super::{Engine, access::ensure_self, with_tx};

impl Engine {
    /// Registers a new account with the starting balance.
    ///
    /// Username and email are unique; the username comparison ignores case.
    pub async fn create_user(&self, cmd: NewUserCmd) -> ResultEngine<User> {
        let username = normalize_required_name(&cmd.username, "username")?;
        let email = normalize_email(&cmd.email)?;
        validate_password(&cmd.password)?;
        let password_hash = hash_password(&cmd.password)?;
        let created_at = Utc::now();

        with_tx!(write self, |db_tx| {
            self.ensure_identity_free(&db_tx, Some(&username), Some(&email), None)
                .await?;

            let model = users::ActiveModel::new_account(username, email, password_hash, created_at)
                .insert(&db_tx)
                .await
                .map_err(EngineError::from_write)?;
            let user = User::try_from(model)?;
            tracing::info!(user_id = %user.id, username = %user.username, "user registered");
            Ok(user)
        })
    }

    /// Resolves a login (email first, then username) and checks the password.
    ///
    /// Every failure is reported as `Unauthorized`, without telling which
    /// half of the credentials was wrong.
    pub async fn authenticate(&self, login: &str, password: &str) -> ResultEngine<User> {
        let login = fold_key(login.trim());
        let model = with_tx!(self, |db_tx| {
            let by_email = users::Entity::find()
                .filter(users::Column::Email.eq(login.clone()))
                .one(&db_tx)
                .await?;
            let model = match by_email {
                Some(model) => Some(model),
                None => {
                    users::Entity::find()
                        .filter(users::Column::UsernameKey.eq(login.clone()))
                        .one(&db_tx)
                        .await?
                }
            };
            Ok::<_, EngineError>(model)
        })?;

        // Unknown logins still pay for one hash verification.
        let verified = match &model {
            Some(model) => verify_password(password, &model.password_hash),
            None => {
                verify_unknown_account(password);
                false
            }
        };
        match model {
            Some(model) if verified => User::try_from(model),
            _ => {
                tracing::debug!("rejected login attempt");
                Err(EngineError::Unauthorized)
            }
        }
    }

    /// Return a user snapshot from DB.
    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            User::try_from(model)
        })
    }

    /// Lists users in registration order.
    pub async fn users(&self, page: Page) -> ResultEngine<Vec<User>> {
        with_tx!(self, |db_tx| {
            let models = users::Entity::find()
                .order_by_asc(users::Column::CreatedAt)
                .order_by_asc(users::Column::Id)
                .offset(page.offset)
                .limit(page.limit)
                .all(&db_tx)
                .await?;
            models.into_iter().map(User::try_from).collect()
        })
    }

    /// Changes username, email or password of the caller's own account.
    pub async fn update_user(&self, cmd: UpdateUserCmd) -> ResultEngine<User> {
        ensure_self(cmd.acting_user_id, cmd.user_id, "update account")?;
        let username = cmd
            .username
            .as_deref()
            .map(|name| normalize_required_name(name, "username"))
            .transpose()?;
        let email = cmd.email.as_deref().map(normalize_email).transpose()?;
        let password_hash = match cmd.password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        with_tx!(write self, |db_tx| {
            let model = self.require_user(&db_tx, cmd.user_id).await?;
            self.ensure_identity_free(
                &db_tx,
                username.as_deref(),
                email.as_deref(),
                Some(cmd.user_id),
            )
            .await?;

            let mut active: users::ActiveModel = model.clone().into();
            if let Some(username) = username {
                active.set_username(username);
            }
            if let Some(email) = email {
                active.email = ActiveValue::Set(email);
            }
            if let Some(password_hash) = password_hash {
                active.password_hash = ActiveValue::Set(password_hash);
            }
            let model = if active.is_changed() {
                active.update(&db_tx).await.map_err(EngineError::from_write)?
            } else {
                model
            };
            User::try_from(model)
        })
    }

    /// Deletes the caller's own account.
    ///
    /// The user's items go with it, and so does every trade that names the
    /// user or one of those items.
    pub async fn delete_user(&self, user_id: Uuid, acting_user_id: Uuid) -> ResultEngine<()> {
        ensure_self(acting_user_id, user_id, "delete account")?;
        with_tx!(write self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let user_id_str = user_id.to_string();

            let item_ids: Vec<String> = items::Entity::find()
                .select_only()
                .column(items::Column::Id)
                .filter(items::Column::OwnerId.eq(user_id_str.clone()))
                .into_tuple()
                .all(&db_tx)
                .await?;

            let trades_removed = trades::Entity::delete_many()
                .filter(
                    Condition::any()
                        .add(trades::Column::ProposerId.eq(user_id_str.clone()))
                        .add(trades::Column::ResponderId.eq(user_id_str.clone()))
                        .add(trades::Column::ProposerItemId.is_in(item_ids.clone()))
                        .add(trades::Column::ResponderItemId.is_in(item_ids)),
                )
                .exec(&db_tx)
                .await?
                .rows_affected;
            let items_removed = items::Entity::delete_many()
                .filter(items::Column::OwnerId.eq(user_id_str.clone()))
                .exec(&db_tx)
                .await?
                .rows_affected;
            users::Entity::delete_by_id(user_id_str).exec(&db_tx).await?;

            tracing::info!(%user_id, items_removed, trades_removed, "user deleted");
            Ok(())
        })
    }
}
