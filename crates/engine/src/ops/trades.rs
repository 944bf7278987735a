use chrono::Utc;
use sea_orm::{
    Condition, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, Page, ProposeTradeCmd, RespondTradeCmd, ResultEngine, Trade, TradeAction,
    TradeStatus, ledger, trades,
    trades::TradeTransition,
    util::parse_uuid,
};

use super::{Engine, with_tx};

/// Moves a trade out of `pending`, failing with `InvalidState` when another
/// writer resolved it first.
async fn resolve_pending(
    db: &DatabaseTransaction,
    trade_id: Uuid,
    next: TradeStatus,
) -> ResultEngine<()> {
    let updated = trades::Entity::update_many()
        .col_expr(trades::Column::Status, Expr::value(next.as_str()))
        .filter(trades::Column::Id.eq(trade_id.to_string()))
        .filter(trades::Column::Status.eq(TradeStatus::Pending.as_str()))
        .exec(db)
        .await?;
    if updated.rows_affected != 1 {
        return Err(EngineError::InvalidState(format!(
            "trade {trade_id} is no longer pending"
        )));
    }
    Ok(())
}

impl Engine {
    /// Offers one of the proposer's items for an item of another user.
    ///
    /// The responder is whoever owns `responder_item_id` right now.
    pub async fn propose_trade(&self, cmd: ProposeTradeCmd) -> ResultEngine<Trade> {
        if cmd.proposer_item_id == cmd.responder_item_id {
            return Err(EngineError::InvalidInput(
                "cannot trade an item for itself".to_string(),
            ));
        }
        let created_at = Utc::now();

        with_tx!(write self, |db_tx| {
            let offered = self.find_item(&db_tx, cmd.proposer_item_id).await?;
            let wanted = self.find_item(&db_tx, cmd.responder_item_id).await?;
            let (Some(offered), Some(wanted)) = (offered, wanted) else {
                return Err(EngineError::KeyNotFound("item not exists".to_string()));
            };
            if offered.owner_id != cmd.proposer_id.to_string() {
                return Err(EngineError::Forbidden(
                    "offered item belongs to another user".to_string(),
                ));
            }
            let responder_id = parse_uuid(&wanted.owner_id, "user")?;
            if responder_id == cmd.proposer_id {
                return Err(EngineError::InvalidInput(
                    "cannot trade with yourself".to_string(),
                ));
            }

            let trade = Trade::pending(
                cmd.proposer_id,
                cmd.proposer_item_id,
                responder_id,
                cmd.responder_item_id,
                created_at,
            );
            trades::ActiveModel::from(&trade).insert(&db_tx).await?;
            tracing::info!(
                trade_id = %trade.id,
                proposer_id = %trade.proposer_id,
                %responder_id,
                "trade proposed"
            );
            Ok(trade)
        })
    }

    /// Accepts or rejects a pending trade addressed to `trader_id`.
    ///
    /// Accepting swaps the owners of both items. If either side gave its
    /// item away since the proposal the trade is stale: the call fails with
    /// `InvalidState` and nothing changes.
    pub async fn respond_trade(&self, cmd: RespondTradeCmd) -> ResultEngine<Trade> {
        with_tx!(write self, |db_tx| {
            let model = self.require_trade(&db_tx, cmd.trade_id).await?;
            let mut trade = Trade::try_from(model)?;
            if trade.responder_id != cmd.trader_id {
                return Err(EngineError::Forbidden(
                    "only the responder can answer this trade".to_string(),
                ));
            }
            let next = trade.status.apply(cmd.action.into())?;
            resolve_pending(&db_tx, trade.id, next).await?;

            if cmd.action == TradeAction::Accept {
                self.swap_items(&db_tx, &trade).await?;
            }

            trade.status = next;
            tracing::info!(trade_id = %trade.id, status = next.as_str(), "trade resolved");
            Ok(trade)
        })
    }

    /// Withdraws a pending trade. Only the proposer may do so.
    pub async fn cancel_trade(&self, proposer_id: Uuid, trade_id: Uuid) -> ResultEngine<Trade> {
        with_tx!(write self, |db_tx| {
            let model = self.require_trade(&db_tx, trade_id).await?;
            let mut trade = Trade::try_from(model)?;
            if trade.proposer_id != proposer_id {
                return Err(EngineError::Forbidden(
                    "only the proposer can cancel this trade".to_string(),
                ));
            }
            let next = trade.status.apply(TradeTransition::Cancel)?;
            resolve_pending(&db_tx, trade.id, next).await?;

            trade.status = next;
            tracing::info!(trade_id = %trade.id, "trade cancelled");
            Ok(trade)
        })
    }

    /// Return a trade snapshot, visible only to its two parties.
    pub async fn trade(&self, user_id: Uuid, trade_id: Uuid) -> ResultEngine<Trade> {
        with_tx!(self, |db_tx| {
            let model = self.require_trade(&db_tx, trade_id).await?;
            let trade = Trade::try_from(model)?;
            if !trade.involves(user_id) {
                return Err(EngineError::KeyNotFound("trade not exists".to_string()));
            }
            Ok(trade)
        })
    }

    /// Trades where `user_id` is proposer or responder, oldest first.
    pub async fn trades_for_user(&self, user_id: Uuid, page: Page) -> ResultEngine<Vec<Trade>> {
        let user_id = user_id.to_string();
        with_tx!(self, |db_tx| {
            let models = trades::Entity::find()
                .filter(
                    Condition::any()
                        .add(trades::Column::ProposerId.eq(user_id.clone()))
                        .add(trades::Column::ResponderId.eq(user_id)),
                )
                .order_by_asc(trades::Column::CreatedAt)
                .order_by_asc(trades::Column::Id)
                .offset(page.offset)
                .limit(page.limit)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Trade::try_from).collect()
        })
    }

    async fn swap_items(&self, db: &DatabaseTransaction, trade: &Trade) -> ResultEngine<()> {
        let offered = self.require_item(db, trade.proposer_item_id).await?;
        let wanted = self.require_item(db, trade.responder_item_id).await?;

        ledger::transfer_ownership(
            db,
            trade.proposer_item_id,
            trade.proposer_id,
            trade.responder_id,
            offered.is_available,
        )
        .await?;
        ledger::transfer_ownership(
            db,
            trade.responder_item_id,
            trade.responder_id,
            trade.proposer_id,
            wanted.is_available,
        )
        .await?;
        Ok(())
    }
}
