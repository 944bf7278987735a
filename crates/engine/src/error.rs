//! The module contains the errors the engine can return.
//!
//! Every failure an operation can hit is a distinct variant, so the transport
//! layer can map each kind to a status code:
//!
//! - [`KeyNotFound`] when a user, item or trade does not exist.
//! - [`Forbidden`] when acting on another user's resource.
//! - [`ExistingKey`] on a uniqueness violation (username, email).
//! - [`InvalidState`] on an illegal trade transition.
//! - [`InsufficientFunds`] and [`ItemUnavailable`] from a purchase.
//! - [`Database`] for store failures, always surfaced.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`InvalidState`]: EngineError::InvalidState
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
//!  [`ItemUnavailable`]: EngineError::ItemUnavailable
//!  [`Database`]: EngineError::Database
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Item unavailable: {0}")]
    ItemUnavailable(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid credentials")]
    Unauthorized,
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Maps a unique-constraint failure from an insert or update to
    /// [`ExistingKey`](EngineError::ExistingKey); anything else stays a
    /// database error.
    pub(crate) fn from_write(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => Self::ExistingKey(detail),
            _ => Self::Database(err),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidState(a), Self::InvalidState(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::ItemUnavailable(a), Self::ItemUnavailable(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::Unauthorized, Self::Unauthorized) => true,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
