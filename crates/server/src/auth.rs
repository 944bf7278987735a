//! Bearer tokens and the `/token` login endpoint.
//!
//! Tokens are HS256 JWTs carrying the user id, the username and an expiry in
//! seconds since the epoch.

use axum::{Form, Json, extract::State};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use api_types::auth::{Token, TokenRequest};
use engine::User;

use crate::{ServerError, server::ServerState};

pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 10_080;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub username: String,
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::BadSignature,
            _ => Self::Malformed,
        }
    }
}

/// Issues and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>, ttl_minutes: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_ref()),
            decoding: DecodingKey::from_secret(secret.as_ref()),
            validation,
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, ServerError> {
        self.issue_at(user, Utc::now())
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }

    fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<String, ServerError> {
        let claims = Claims {
            user_id: user.id,
            username: user.username.clone(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| ServerError::Generic(format!("cannot sign token: {err}")))
    }
}

/// `POST /token`: exchanges username (or email) and password for a token.
pub async fn login(
    State(state): State<ServerState>,
    Form(payload): Form<TokenRequest>,
) -> Result<Json<Token>, ServerError> {
    let user = state
        .engine
        .authenticate(&payload.username, &payload.password)
        .await?;
    let access_token = state.tokens.issue(&user)?;
    tracing::debug!(user_id = %user.id, "token issued");
    Ok(Json(Token {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
