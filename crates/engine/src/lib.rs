//! Marketplace engine: users own items, buy them with their balance, and
//! swap them through trades.
//!
//! All state lives in the database handed to [`Engine::builder`]; every
//! public operation runs inside one store transaction, so a purchase or a
//! trade acceptance either applies completely or not at all.

pub use commands::{
    BuyCmd, ItemSearch, NewItemCmd, NewUserCmd, Page, ProposeTradeCmd, RespondTradeCmd,
    UpdateItemCmd, UpdateUserCmd,
};
pub use error::EngineError;
pub use items::Item;
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder};
pub use trades::{Trade, TradeAction, TradeStatus};
pub use users::User;

mod commands;
mod error;
mod items;
mod ledger;
mod money;
mod ops;
mod password;
mod trades;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
