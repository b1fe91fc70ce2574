//! User — the identity every other record is scoped to.

use crate::error::{BizDirError, ValidationError};
use crate::id::UserId;
use crate::time::Timestamp;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 5;

/// A registered account.
///
/// Not `Serialize`: the password hash never leaves the server. Adapters map
/// the public fields explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// A user that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// An opaque API token bound to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub key: String,
    pub user_id: UserId,
    pub created: Timestamp,
}

/// Normalize an email address: trim surrounding whitespace and lowercase
/// the domain part. The local part is kept as typed.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyEmail`] when nothing is left after trimming.
pub fn normalize_email(raw: &str) -> Result<String, BizDirError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyEmail.into());
    }
    let normalized = match trimmed.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => trimmed.to_string(),
    };
    Ok(normalized)
}

/// Check the password length rule.
///
/// # Errors
///
/// Returns [`ValidationError::PasswordTooShort`] below [`MIN_PASSWORD_LEN`].
pub fn validate_password(password: &str) -> Result<(), BizDirError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        }
        .into());
    }
    Ok(())
}
