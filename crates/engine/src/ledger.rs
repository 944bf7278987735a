//! Balance and ownership primitives.
//!
//! These are the only writers of `users.balance_minor`, `items.owner_id` and
//! `items.is_available`. Each one is a single guarded `UPDATE` checked through
//! `rows_affected`, so a concurrent writer that got there first makes the
//! guard fail instead of being overwritten. They never commit: callers compose
//! them inside one engine transaction.

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, items, users};

/// Moves exactly `amount` from `from` to `to`.
///
/// The debit only applies while `from` still holds at least `amount`.
pub(crate) async fn transfer_funds(
    db: &DatabaseTransaction,
    from: Uuid,
    to: Uuid,
    amount: MoneyCents,
) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::InvalidInput(
            "transfer amount must be >= 0".to_string(),
        ));
    }
    if from == to {
        return Err(EngineError::InvalidInput(
            "cannot transfer funds to the same account".to_string(),
        ));
    }

    let debited = users::Entity::update_many()
        .col_expr(
            users::Column::BalanceMinor,
            Expr::col(users::Column::BalanceMinor).sub(amount.cents()),
        )
        .filter(users::Column::Id.eq(from.to_string()))
        .filter(users::Column::BalanceMinor.gte(amount.cents()))
        .exec(db)
        .await?;
    if debited.rows_affected != 1 {
        let payer = users::Entity::find_by_id(from.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        return Err(EngineError::InsufficientFunds(format!(
            "balance {} is below {amount}",
            MoneyCents::new(payer.balance_minor)
        )));
    }

    let credited = users::Entity::update_many()
        .col_expr(
            users::Column::BalanceMinor,
            Expr::col(users::Column::BalanceMinor).add(amount.cents()),
        )
        .filter(users::Column::Id.eq(to.to_string()))
        .exec(db)
        .await?;
    if credited.rows_affected != 1 {
        return Err(EngineError::KeyNotFound("user not exists".to_string()));
    }

    Ok(())
}

/// Reassigns `item_id` from `from_owner` to `new_owner`, setting its
/// availability to `available`.
///
/// Fails with `InvalidState` if the item no longer belongs to `from_owner`.
pub(crate) async fn transfer_ownership(
    db: &DatabaseTransaction,
    item_id: Uuid,
    from_owner: Uuid,
    new_owner: Uuid,
    available: bool,
) -> ResultEngine<()> {
    let moved = reassign(db, item_id, from_owner, new_owner, available, false).await?;
    if moved != 1 {
        return Err(EngineError::InvalidState(format!(
            "item {item_id} is no longer owned by {from_owner}"
        )));
    }
    Ok(())
}

/// Takes an available item off the market for `buyer`.
///
/// Of several concurrent claims on the same item exactly one observes
/// `is_available = true`; the others get `ItemUnavailable`.
pub(crate) async fn claim_for_sale(
    db: &DatabaseTransaction,
    item_id: Uuid,
    seller: Uuid,
    buyer: Uuid,
) -> ResultEngine<()> {
    let claimed = reassign(db, item_id, seller, buyer, false, true).await?;
    if claimed != 1 {
        return Err(EngineError::ItemUnavailable(format!(
            "item {item_id} is not available"
        )));
    }
    Ok(())
}

async fn reassign(
    db: &DatabaseTransaction,
    item_id: Uuid,
    from_owner: Uuid,
    new_owner: Uuid,
    available: bool,
    require_available: bool,
) -> ResultEngine<u64> {
    let mut update = items::Entity::update_many()
        .col_expr(items::Column::OwnerId, Expr::value(new_owner.to_string()))
        .col_expr(items::Column::IsAvailable, Expr::value(available))
        .filter(items::Column::Id.eq(item_id.to_string()))
        .filter(items::Column::OwnerId.eq(from_owner.to_string()));
    if require_available {
        update = update.filter(items::Column::IsAvailable.eq(true));
    }
    Ok(update.exec(db).await?.rows_affected)
}
