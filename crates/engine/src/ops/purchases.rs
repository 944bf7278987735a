use sea_orm::TransactionTrait;

use crate::{BuyCmd, EngineError, Item, MoneyCents, ResultEngine, ledger, util::parse_uuid};

use super::{Engine, with_tx};

impl Engine {
    /// Buys an item with the buyer's balance.
    ///
    /// Checks run in order and the first failure wins:
    /// 1. the caller must be the buyer (`Forbidden`);
    /// 2. buyer and item must exist (`KeyNotFound`);
    /// 3. the item must be available and priced (`ItemUnavailable`);
    /// 4. the buyer must not already own it (`Forbidden`);
    /// 5. the buyer must hold at least the price (`InsufficientFunds`).
    ///
    /// On success the price moves from buyer to seller, the item changes
    /// owner and leaves the market, all in one transaction. Of two concurrent
    /// purchases of the same item only one can claim it.
    pub async fn buy(&self, cmd: BuyCmd) -> ResultEngine<Item> {
        if cmd.acting_user_id != cmd.buyer_id {
            return Err(EngineError::Forbidden(
                "cannot buy on behalf of another user".to_string(),
            ));
        }

        with_tx!(write self, |db_tx| {
            let buyer = self.find_user(&db_tx, cmd.buyer_id).await?;
            let item = self.find_item(&db_tx, cmd.item_id).await?;
            let (Some(buyer), Some(item)) = (buyer, item) else {
                return Err(EngineError::KeyNotFound(
                    "user or item not exists".to_string(),
                ));
            };

            if !item.is_available {
                return Err(EngineError::ItemUnavailable(format!(
                    "item {} is not available",
                    cmd.item_id
                )));
            }
            let Some(price) = item.price_minor.map(MoneyCents::new) else {
                return Err(EngineError::ItemUnavailable(format!(
                    "item {} has no price",
                    cmd.item_id
                )));
            };
            let seller_id = parse_uuid(&item.owner_id, "user")?;
            if seller_id == cmd.buyer_id {
                return Err(EngineError::Forbidden(
                    "cannot buy your own item".to_string(),
                ));
            }
            let balance = MoneyCents::new(buyer.balance_minor);
            if balance < price {
                return Err(EngineError::InsufficientFunds(format!(
                    "balance {balance} is below price {price}"
                )));
            }

            ledger::claim_for_sale(&db_tx, cmd.item_id, seller_id, cmd.buyer_id).await?;
            ledger::transfer_funds(&db_tx, cmd.buyer_id, seller_id, price).await?;

            let item = Item::try_from(self.require_item(&db_tx, cmd.item_id).await?)?;
            tracing::info!(
                item_id = %item.id,
                buyer_id = %cmd.buyer_id,
                %seller_id,
                %price,
                "item sold"
            );
            Ok(item)
        })
    }
}
