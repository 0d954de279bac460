//! External report sharing via unguessable tokens.
//!
//! The plaintext token is returned once at creation; only its SHA-256 hash
//! is persisted and used for lookup.

use chrono::Duration;
use rand::Rng;
use serde::Serialize;
use validator::ValidateEmail;

use crate::error::CoreError;
use crate::hashing;
use crate::report::ReportStatus;
use crate::types::Timestamp;

/// Length of a generated share token.
pub const TOKEN_LENGTH: usize = 40;

pub const MIN_EXPIRY_DAYS: i64 = 1;
pub const MAX_EXPIRY_DAYS: i64 = 90;
pub const DEFAULT_EXPIRY_DAYS: i64 = 14;

/// Shares expired for longer than this are purged by the sweeper.
pub const PURGE_AFTER_DAYS: i64 = 30;

/// A freshly generated token and the hash to store.
#[derive(Debug, Clone)]
pub struct GeneratedToken {
    pub token: String,
    pub token_hash: String,
}

/// Generate a random alphanumeric share token.
pub fn generate_token() -> GeneratedToken {
    let token: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect();
    let token_hash = hash_token(&token);
    GeneratedToken { token, token_hash }
}

/// Hash a presented token for lookup.
pub fn hash_token(token: &str) -> String {
    hashing::sha256_hex(token.as_bytes())
}

/// Resolve the requested expiry (or the default) and check its range.
pub fn resolve_expiry_days(requested: Option<i64>, default_days: i64) -> Result<i64, CoreError> {
    let days = requested.unwrap_or(default_days);
    if !(MIN_EXPIRY_DAYS..=MAX_EXPIRY_DAYS).contains(&days) {
        return Err(CoreError::Validation(format!(
            "Share expiry must be between {MIN_EXPIRY_DAYS} and {MAX_EXPIRY_DAYS} days"
        )));
    }
    Ok(days)
}

pub fn expires_at(now: Timestamp, days: i64) -> Timestamp {
    now + Duration::days(days)
}

/// A share's recipient is optional, but when given it must be an email address.
pub fn validate_recipient_email(email: Option<&str>) -> Result<(), CoreError> {
    match email {
        Some(e) if !e.validate_email() => Err(CoreError::Validation(format!(
            "'{e}' is not a valid recipient email"
        ))),
        _ => Ok(()),
    }
}

/// Only approved or finalised reports may leave the organisation.
pub fn ensure_shareable(status: ReportStatus) -> Result<(), CoreError> {
    if status.is_shareable() {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Only approved or finalised reports can be shared (status '{status}')"
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareState {
    Active,
    Expired,
    Revoked,
}

/// Revocation wins over expiry.
pub fn share_state(
    expires_at: Timestamp,
    revoked_at: Option<Timestamp>,
    now: Timestamp,
) -> ShareState {
    if revoked_at.is_some() {
        ShareState::Revoked
    } else if now >= expires_at {
        ShareState::Expired
    } else {
        ShareState::Active
    }
}
