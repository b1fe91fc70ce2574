//! Attribute — an owner-scoped named tag attached to businesses.
//!
//! Categories and services have identical shape and rules, so they share one
//! type discriminated by [`AttributeKind`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BizDirError, ValidationError};
use crate::id::{AttributeId, UserId};

/// Which attribute table a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Category,
    Service,
}

impl AttributeKind {
    /// Human-readable entity label used in error messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Service => "Service",
        }
    }

    /// Name of the business payload field holding ids of this kind.
    #[must_use]
    pub fn field(self) -> &'static str {
        match self {
            Self::Category => "categories",
            Self::Service => "services",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A category or service owned by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub id: AttributeId,
    pub owner_id: UserId,
    pub kind: AttributeKind,
    pub name: String,
}

/// Validated input for creating an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttribute {
    pub kind: AttributeKind,
    pub name: String,
}

impl NewAttribute {
    /// Validate and build a new attribute draft.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Required`] when `name` is absent and
    /// [`ValidationError::EmptyName`] when it is blank.
    pub fn new(kind: AttributeKind, name: Option<String>) -> Result<Self, BizDirError> {
        let name = name.ok_or(ValidationError::Required { field: "name" })?;
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(Self { kind, name })
    }
}
