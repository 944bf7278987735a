//! Engine snapshots rendered as API bodies.

use std::collections::HashMap;

use api_types::{
    PageQuery,
    item::ItemView,
    trade::{TradeStatus, TradeView},
    user::UserView,
};
use engine::{Item, Page, Trade, User};
use uuid::Uuid;

pub(crate) fn page(query: PageQuery) -> Page {
    Page::new(
        query.offset.unwrap_or(0),
        query.limit.unwrap_or(Page::DEFAULT_LIMIT),
    )
}

pub(crate) fn item_view(item: Item) -> ItemView {
    ItemView {
        id: item.id,
        name: item.name,
        description: item.description,
        price_minor: item.price.map(|price| price.cents()),
        is_available: item.is_available,
        owner_id: item.owner_id,
        created_at: item.created_at,
    }
}

pub(crate) fn user_view(user: User, items: Vec<Item>) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
        email: user.email,
        balance_minor: user.balance.cents(),
        created_at: user.created_at,
        items: items.into_iter().map(item_view).collect(),
    }
}

/// Pairs every user with the items it owns, keeping the users' order.
pub(crate) fn user_views(users: Vec<User>, items: Vec<Item>) -> Vec<UserView> {
    let mut by_owner: HashMap<Uuid, Vec<Item>> = HashMap::new();
    for item in items {
        by_owner.entry(item.owner_id).or_default().push(item);
    }
    users
        .into_iter()
        .map(|user| {
            let items = by_owner.remove(&user.id).unwrap_or_default();
            user_view(user, items)
        })
        .collect()
}

pub(crate) fn trade_view(trade: Trade) -> TradeView {
    TradeView {
        id: trade.id,
        proposer_id: trade.proposer_id,
        proposer_item_id: trade.proposer_item_id,
        responder_id: trade.responder_id,
        responder_item_id: trade.responder_item_id,
        status: match trade.status {
            engine::TradeStatus::Pending => TradeStatus::Pending,
            engine::TradeStatus::Accepted => TradeStatus::Accepted,
            engine::TradeStatus::Rejected => TradeStatus::Rejected,
            engine::TradeStatus::Cancelled => TradeStatus::Cancelled,
        },
        created_at: trade.created_at,
    }
}
