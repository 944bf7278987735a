use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Distinguishes a missing field (`None`) from an explicit `null`
/// (`Some(None)`) in request bodies.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Offset/limit query parameters shared by listings.
///
/// `skip` is accepted as an alias of `offset`.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default, alias = "skip")]
    pub offset: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

/// Generic acknowledgement body.
#[derive(Debug, Serialize, Deserialize)]
pub struct Detail {
    pub detail: String,
}

pub mod auth {
    use super::*;

    /// Form body of `POST /token`. `username` may also be an email.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TokenRequest {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Token {
        pub access_token: String,
        pub token_type: String,
    }
}

pub mod item {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemNew {
        pub name: String,
        pub description: Option<String>,
        pub price_minor: Option<i64>,
    }

    /// Partial update of an item. Sending `null` for `description` or
    /// `price_minor` clears the field; omitting it leaves it untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ItemUpdate {
        pub name: Option<String>,
        #[serde(
            default,
            deserialize_with = "crate::double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub description: Option<Option<String>>,
        #[serde(
            default,
            deserialize_with = "crate::double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub price_minor: Option<Option<i64>>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ItemView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub price_minor: Option<i64>,
        pub is_available: bool,
        pub owner_id: Uuid,
        pub created_at: DateTime<Utc>,
    }

    /// Query of `GET /items/search`. Prices are in minor units.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ItemSearchQuery {
        pub q: Option<String>,
        pub min_price: Option<i64>,
        pub max_price: Option<i64>,
        pub owner_id: Option<Uuid>,
        pub available: Option<bool>,
        #[serde(default, alias = "skip")]
        pub offset: Option<u64>,
        pub limit: Option<u64>,
    }
}

pub mod user {
    use super::*;
    use crate::item::ItemView;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub username: String,
        pub email: String,
        pub password: String,
    }

    /// Partial update of the caller's own account. The balance is not
    /// editable.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserUpdate {
        pub username: Option<String>,
        pub email: Option<String>,
        pub password: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub username: String,
        pub email: String,
        pub balance_minor: i64,
        pub created_at: DateTime<Utc>,
        pub items: Vec<ItemView>,
    }
}

pub mod trade {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TradeStatus {
        Pending,
        Accepted,
        Rejected,
        Cancelled,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TradeAction {
        Accept,
        Reject,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TradeNew {
        pub proposer_item_id: Uuid,
        pub responder_item_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TradeRespond {
        pub action: TradeAction,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TradeView {
        pub id: Uuid,
        pub proposer_id: Uuid,
        pub proposer_item_id: Uuid,
        pub responder_id: Uuid,
        pub responder_item_id: Uuid,
        pub status: TradeStatus,
        pub created_at: DateTime<Utc>,
    }
}
