//! Password hashing.
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`)
//! with a random per-user salt. The parameters travel inside the string, so
//! they can be raised later without invalidating existing credentials.

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::{EngineError, ResultEngine};

/// Verified against when a login names no account, so both paths cost one
/// Argon2 run.
static UNKNOWN_ACCOUNT_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("no such account").unwrap_or_default());

pub(crate) fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::InvalidInput(format!("cannot hash password: {err}")))
}

/// Checks `password` against a stored hash. Malformed hashes never verify.
pub(crate) fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub(crate) fn verify_unknown_account(password: &str) {
    let _ = verify_password(password, &UNKNOWN_ACCOUNT_HASH);
}
