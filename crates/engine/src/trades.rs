//! Trade primitives.
//!
//! A `Trade` proposes exchanging one item for another between two users.
//! Its status is a closed state machine:
//!
//! ```text
//! pending ──accept──▶ accepted
//!    │ ────reject──▶ rejected
//!    └─────cancel──▶ cancelled
//! ```
//!
//! Every transition starts from `pending`; terminal states have no way out.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl TradeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns the status reached by applying `transition`, or
    /// `InvalidState` when the trade has already been resolved.
    pub(crate) fn apply(self, transition: TradeTransition) -> ResultEngine<TradeStatus> {
        match (self, transition) {
            (Self::Pending, TradeTransition::Accept) => Ok(Self::Accepted),
            (Self::Pending, TradeTransition::Reject) => Ok(Self::Rejected),
            (Self::Pending, TradeTransition::Cancel) => Ok(Self::Cancelled),
            (status, _) => Err(EngineError::InvalidState(format!(
                "trade is already {}",
                status.as_str()
            ))),
        }
    }
}

impl TryFrom<&str> for TradeStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::InvalidState(format!(
                "invalid trade status: {other}"
            ))),
        }
    }
}

/// What the responder does with a pending trade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeAction {
    Accept,
    Reject,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TradeTransition {
    Accept,
    Reject,
    Cancel,
}

impl From<TradeAction> for TradeTransition {
    fn from(action: TradeAction) -> Self {
        match action {
            TradeAction::Accept => Self::Accept,
            TradeAction::Reject => Self::Reject,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub proposer_id: Uuid,
    pub proposer_item_id: Uuid,
    pub responder_id: Uuid,
    pub responder_item_id: Uuid,
    pub status: TradeStatus,
    pub created_at: DateTime<Utc>,
}

impl Trade {
    pub(crate) fn pending(
        proposer_id: Uuid,
        proposer_item_id: Uuid,
        responder_id: Uuid,
        responder_item_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            proposer_id,
            proposer_item_id,
            responder_id,
            responder_item_id,
            status: TradeStatus::Pending,
            created_at,
        }
    }

    /// `true` if `user_id` is one of the two parties.
    #[must_use]
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.proposer_id == user_id || self.responder_id == user_id
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "trades")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub proposer_id: String,
    pub proposer_item_id: String,
    pub responder_id: String,
    pub responder_item_id: String,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Trade> for ActiveModel {
    fn from(trade: &Trade) -> Self {
        Self {
            id: ActiveValue::Set(trade.id.to_string()),
            proposer_id: ActiveValue::Set(trade.proposer_id.to_string()),
            proposer_item_id: ActiveValue::Set(trade.proposer_item_id.to_string()),
            responder_id: ActiveValue::Set(trade.responder_id.to_string()),
            responder_item_id: ActiveValue::Set(trade.responder_item_id.to_string()),
            status: ActiveValue::Set(trade.status.as_str().to_string()),
            created_at: ActiveValue::Set(trade.created_at),
        }
    }
}

impl TryFrom<Model> for Trade {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "trade")?,
            proposer_id: parse_uuid(&model.proposer_id, "user")?,
            proposer_item_id: parse_uuid(&model.proposer_item_id, "item")?,
            responder_id: parse_uuid(&model.responder_id, "user")?,
            responder_item_id: parse_uuid(&model.responder_item_id, "item")?,
            status: TradeStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_reaches_every_terminal_state() {
        let pending = TradeStatus::Pending;
        assert_eq!(
            pending.apply(TradeTransition::Accept).unwrap(),
            TradeStatus::Accepted
        );
        assert_eq!(
            pending.apply(TradeTransition::Reject).unwrap(),
            TradeStatus::Rejected
        );
        assert_eq!(
            pending.apply(TradeTransition::Cancel).unwrap(),
            TradeStatus::Cancelled
        );
    }

    #[test]
    fn terminal_states_reject_every_transition() {
        for status in [
            TradeStatus::Accepted,
            TradeStatus::Rejected,
            TradeStatus::Cancelled,
        ] {
            assert!(status.is_terminal());
            for transition in [
                TradeTransition::Accept,
                TradeTransition::Reject,
                TradeTransition::Cancel,
            ] {
                assert!(matches!(
                    status.apply(transition),
                    Err(EngineError::InvalidState(_))
                ));
            }
        }
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            TradeStatus::Pending,
            TradeStatus::Accepted,
            TradeStatus::Rejected,
            TradeStatus::Cancelled,
        ] {
            assert_eq!(TradeStatus::try_from(status.as_str()).unwrap(), status);
        }
        assert!(TradeStatus::try_from("countered").is_err());
    }
}
