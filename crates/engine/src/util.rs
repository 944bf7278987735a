//! Internal helpers for input validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidInput(format!("invalid {label} id")))
}

pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Case-folded form used for every case-insensitive comparison.
///
/// Stored next to the original text and compared in Rust terms, since SQLite
/// `LOWER()` and `LIKE` only fold ASCII.
pub(crate) fn fold_key(value: &str) -> String {
    value.to_lowercase()
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Trims and lowercases an email, requiring a single `@` between a non-empty
/// local part and a domain containing a dot.
pub(crate) fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = fold_key(value.trim());
    let invalid = || EngineError::InvalidInput(format!("invalid email: {value}"));
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }
    Ok(email)
}

pub(crate) fn validate_password(value: &str) -> ResultEngine<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(EngineError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub(crate) fn validate_price(price: Option<MoneyCents>) -> ResultEngine<()> {
    if price.is_some_and(MoneyCents::is_negative) {
        return Err(EngineError::InvalidInput(
            "price must be >= 0".to_string(),
        ));
    }
    Ok(())
}
