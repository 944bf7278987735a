use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use engine::EngineError;

use serde::Serialize;
pub use auth::{Claims, DEFAULT_TOKEN_TTL_MINUTES, TokenError, TokenSigner};
pub use server::{ServerState, app, run_with_listener};

mod auth;
mod items;
mod purchases;
mod server;
mod trades;
mod users;
mod views;

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    /// Missing, malformed, expired or forged bearer token.
    Unauthorized(String),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_)
        | EngineError::InvalidState(_)
        | EngineError::ItemUnavailable(_) => StatusCode::CONFLICT,
        EngineError::InsufficientFunds(_) | EngineError::InvalidInput(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EngineError::Unauthorized => StatusCode::UNAUTHORIZED,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Unauthorized(err) => (StatusCode::UNAUTHORIZED, err),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        let mut response = (status, Json(Error { error })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<TokenError> for ServerError {
    fn from(value: TokenError) -> Self {
        Self::Unauthorized(value.to_string())
    }
}
