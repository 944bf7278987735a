//! Command structs for engine operations.
//!
//! These types group parameters for write operations (registration, item
//! edits, purchases, trades) and listing filters, keeping call sites
//! readable and avoiding long argument lists.

use uuid::Uuid;

use crate::{MoneyCents, TradeAction};

/// Offset/limit window for listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

impl Page {
    pub const DEFAULT_LIMIT: u64 = 100;
    pub const MAX_LIMIT: u64 = 500;

    /// Builds a page, clamping `limit` to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(offset: u64, limit: u64) -> Self {
        Self {
            offset,
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_LIMIT)
    }
}

/// Register a new account.
#[derive(Clone, Debug)]
pub struct NewUserCmd {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl NewUserCmd {
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Update profile fields of an account. Unset fields are left untouched.
///
/// The balance is deliberately absent: it only moves through purchases.
#[derive(Clone, Debug)]
pub struct UpdateUserCmd {
    pub user_id: Uuid,
    pub acting_user_id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserCmd {
    #[must_use]
    pub fn new(user_id: Uuid, acting_user_id: Uuid) -> Self {
        Self {
            user_id,
            acting_user_id,
            username: None,
            email: None,
            password: None,
        }
    }

    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

/// List a new item for `owner_id`.
#[derive(Clone, Debug)]
pub struct NewItemCmd {
    pub owner_id: Uuid,
    pub acting_user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<MoneyCents>,
}

impl NewItemCmd {
    #[must_use]
    pub fn new(owner_id: Uuid, acting_user_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            owner_id,
            acting_user_id,
            name: name.into(),
            description: None,
            price: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn price(mut self, price: MoneyCents) -> Self {
        self.price = Some(price);
        self
    }
}

/// Edit the descriptive fields of an item.
///
/// `description` and `price` are double options: `Some(None)` clears the
/// field, `None` leaves it untouched. Ownership and availability cannot be
/// changed from here.
#[derive(Clone, Debug)]
pub struct UpdateItemCmd {
    pub item_id: Uuid,
    pub acting_user_id: Uuid,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<Option<MoneyCents>>,
}

impl UpdateItemCmd {
    #[must_use]
    pub fn new(item_id: Uuid, acting_user_id: Uuid) -> Self {
        Self {
            item_id,
            acting_user_id,
            name: None,
            description: None,
            price: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    #[must_use]
    pub fn price(mut self, price: Option<MoneyCents>) -> Self {
        self.price = Some(price);
        self
    }
}

/// Buy `item_id` on behalf of `buyer_id`.
///
/// `acting_user_id` is the authenticated caller; it must be the buyer.
#[derive(Clone, Copy, Debug)]
pub struct BuyCmd {
    pub buyer_id: Uuid,
    pub item_id: Uuid,
    pub acting_user_id: Uuid,
}

impl BuyCmd {
    /// A purchase where the caller buys for themselves.
    #[must_use]
    pub fn new(buyer_id: Uuid, item_id: Uuid) -> Self {
        Self {
            buyer_id,
            item_id,
            acting_user_id: buyer_id,
        }
    }

    #[must_use]
    pub fn acting_user(mut self, acting_user_id: Uuid) -> Self {
        self.acting_user_id = acting_user_id;
        self
    }
}

/// Offer `proposer_item_id` in exchange for `responder_item_id`.
///
/// The responder is never supplied: it is whoever owns `responder_item_id`.
#[derive(Clone, Copy, Debug)]
pub struct ProposeTradeCmd {
    pub proposer_id: Uuid,
    pub proposer_item_id: Uuid,
    pub responder_item_id: Uuid,
}

impl ProposeTradeCmd {
    #[must_use]
    pub fn new(proposer_id: Uuid, proposer_item_id: Uuid, responder_item_id: Uuid) -> Self {
        Self {
            proposer_id,
            proposer_item_id,
            responder_item_id,
        }
    }
}

/// Accept or reject a pending trade.
#[derive(Clone, Copy, Debug)]
pub struct RespondTradeCmd {
    pub trader_id: Uuid,
    pub trade_id: Uuid,
    pub action: TradeAction,
}

impl RespondTradeCmd {
    #[must_use]
    pub fn new(trader_id: Uuid, trade_id: Uuid, action: TradeAction) -> Self {
        Self {
            trader_id,
            trade_id,
            action,
        }
    }
}

/// Filters for searching items. All set filters must match (AND); unset
/// filters impose nothing.
#[derive(Clone, Debug, Default)]
pub struct ItemSearch {
    /// Case-insensitive substring of the name or the description.
    pub text: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<MoneyCents>,
    /// Inclusive upper price bound.
    pub max_price: Option<MoneyCents>,
    pub owner_id: Option<Uuid>,
    pub available: Option<bool>,
}

impl ItemSearch {
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn min_price(mut self, price: MoneyCents) -> Self {
        self.min_price = Some(price);
        self
    }

    #[must_use]
    pub fn max_price(mut self, price: MoneyCents) -> Self {
        self.max_price = Some(price);
        self
    }

    #[must_use]
    pub fn owner(mut self, owner_id: Uuid) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    #[must_use]
    pub fn available(mut self, available: bool) -> Self {
        self.available = Some(available);
        self
    }
}
