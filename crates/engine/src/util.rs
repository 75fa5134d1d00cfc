//! Internal helpers for input validation and credentials.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every write path enforces the same rules.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::{EngineError, ResultEngine, plans::DEFAULT_BACKGROUND_COLOR};

/// Maximum length of a plan title, in characters.
pub(crate) const MAX_TITLE_CHARS: usize = 200;

const COPY_PREFIX: &str = "Copy of ";

/// Trim a title and reject blank or too long values.
pub(crate) fn normalize_title(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} title must not be empty"
        )));
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(EngineError::InvalidInput(format!(
            "{label} title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim note content and reject blank values.
pub(crate) fn normalize_content(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(
            "note content must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_amount(amount_cents: i64, label: &str) -> ResultEngine<()> {
    if amount_cents <= 0 {
        return Err(EngineError::InvalidInput(format!(
            "{label} amount must be > 0"
        )));
    }
    Ok(())
}

pub(crate) fn validate_period(start: NaiveDate, end: NaiveDate) -> ResultEngine<()> {
    if end < start {
        return Err(EngineError::InvalidInput(format!(
            "period end {end} is before period start {start}"
        )));
    }
    Ok(())
}

/// Validate a `#RRGGBB` color, falling back to the default when missing.
pub(crate) fn normalize_color(value: Option<&str>) -> ResultEngine<String> {
    let Some(color) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_BACKGROUND_COLOR.to_string());
    };
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(EngineError::InvalidInput(format!(
            "invalid background color: {color}"
        )));
    }
    Ok(color.to_string())
}

/// Title of a duplicated plan, cut on a character boundary.
pub(crate) fn copy_title(title: &str) -> String {
    format!("{COPY_PREFIX}{title}")
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect()
}

/// Reject duplicated ids in an ordering payload.
pub(crate) fn ensure_unique_ids(ids: &[Uuid], label: &str) -> ResultEngine<()> {
    if ids.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} order must not be empty"
        )));
    }
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(*id) {
            return Err(EngineError::InvalidInput(format!(
                "{label} {id} appears more than once"
            )));
        }
    }
    Ok(())
}

pub(crate) fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = value.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(EngineError::InvalidInput(format!("invalid email: {value}")));
    }
    Ok(email)
}

/// Hash a password as `salt$hex(sha256(salt || password))`.
pub(crate) fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    let digest = salted_digest(&salt, password);
    format!("{salt}${}", hex::encode(digest))
}

/// Check a password against a stored hash, comparing digests in constant time.
pub(crate) fn verify_password(stored: &str, password: &str) -> bool {
    let Some((salt, encoded)) = stored.split_once('$') else {
        return false;
    };
    let Ok(expected) = hex::decode(encoded) else {
        return false;
    };
    salted_digest(salt, password)
        .as_slice()
        .ct_eq(&expected)
        .into()
}

fn salted_digest(salt: &str, password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}
