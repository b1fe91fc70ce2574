//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`BizDirError`]
//! via `From`, so handlers only ever match on one enum.

use std::error::Error as StdError;

/// Top-level error returned by every service and port.
#[derive(Debug, thiserror::Error)]
pub enum BizDirError {
    /// Input rejected by a domain invariant.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The requested record does not exist for the caller.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The caller could not be identified.
    #[error("unauthorized")]
    Unauthorized(#[from] AuthError),

    /// An adapter failed (database, filesystem, hashing, …).
    #[error("storage error")]
    Storage(Box<dyn StdError + Send + Sync>),
}

/// Input validation failures, each tied to the payload field it concerns.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("This field is required.")]
    Required { field: &'static str },

    #[error("This field may not be blank.")]
    EmptyName,

    #[error("This field may not be blank.")]
    EmptyEmail,

    #[error("Ensure this field has at least {min} characters.")]
    PasswordTooShort { min: usize },

    #[error("A user with this email already exists.")]
    EmailTaken,

    #[error("Unable to authenticate with provided credentials.")]
    InvalidCredentials,

    #[error("Invalid id list {value:?}: expected comma-separated integers.")]
    MalformedIds { field: &'static str, value: String },

    #[error("A valid integer is required, got {value:?}.")]
    MalformedFlag { field: &'static str, value: String },

    #[error("Invalid pk \"{id}\" - object does not exist.")]
    UnknownReference { field: &'static str, id: i64 },

    #[error("Upload a valid image. The file you uploaded was either not an image or a corrupted image.")]
    InvalidImage,

    #[error("Malformed request body: {detail}")]
    MalformedBody { detail: String },
}

impl ValidationError {
    /// Name of the payload field the error is reported under.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field }
            | Self::MalformedIds { field, .. }
            | Self::MalformedFlag { field, .. }
            | Self::UnknownReference { field, .. } => field,
            Self::EmptyName => "name",
            Self::EmptyEmail | Self::EmailTaken => "email",
            Self::PasswordTooShort { .. } => "password",
            Self::InvalidCredentials | Self::MalformedBody { .. } => "non_field_errors",
            Self::InvalidImage => "image",
        }
    }
}

/// A record lookup that matched nothing visible to the caller.
///
/// Records owned by someone else produce the same error as missing ones.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Reasons a request could not be tied to a user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication credentials were not provided.")]
    MissingCredentials,

    #[error("Invalid token header.")]
    MalformedHeader,

    #[error("Invalid token.")]
    InvalidToken,

    #[error("User inactive or deleted.")]
    InactiveUser,
}
