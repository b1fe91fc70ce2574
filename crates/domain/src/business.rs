//! Business — the aggregate linking a name and optional image to sets of
//! categories and services.
//!
//! Relationship sets follow two different update rules:
//! - a **partial** update ([`BusinessPatch`]) replaces a set only when the
//!   payload carries it, and keeps it otherwise;
//! - a **full** update ([`BusinessDraft::from_full_update`]) clears any set the
//!   payload omits.

use std::collections::BTreeSet;

use crate::attribute::{Attribute, AttributeKind};
use crate::error::{BizDirError, ValidationError};
use crate::id::{AttributeId, BusinessId, UserId};

/// Logical prefix every stored business image lives under.
pub const IMAGE_PREFIX: &str = "uploads/business/";

/// A persisted business with its relationship sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Business {
    pub id: BusinessId,
    pub owner_id: UserId,
    pub name: String,
    pub image: Option<String>,
    pub categories: BTreeSet<AttributeId>,
    pub services: BTreeSet<AttributeId>,
}

impl Business {
    /// The relationship set for `kind`.
    #[must_use]
    pub fn links(&self, kind: AttributeKind) -> &BTreeSet<AttributeId> {
        match kind {
            AttributeKind::Category => &self.categories,
            AttributeKind::Service => &self.services,
        }
    }
}

/// A business with its categories and services resolved to full records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessDetail {
    pub business: Business,
    pub categories: Vec<Attribute>,
    pub services: Vec<Attribute>,
}

/// The complete writable state of a business: what gets persisted on create
/// and on either kind of update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessDraft {
    pub name: String,
    pub categories: BTreeSet<AttributeId>,
    pub services: BTreeSet<AttributeId>,
}

impl BusinessDraft {
    /// Build a draft for a create call. Omitted sets default to empty.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Required`] or [`ValidationError::EmptyName`]
    /// when `name` is missing or blank.
    pub fn new(
        name: Option<String>,
        categories: Option<Vec<AttributeId>>,
        services: Option<Vec<AttributeId>>,
    ) -> Result<Self, BizDirError> {
        let name = name.ok_or(ValidationError::Required { field: "name" })?;
        validate_name(&name)?;
        Ok(Self {
            name,
            categories: categories.unwrap_or_default().into_iter().collect(),
            services: services.unwrap_or_default().into_iter().collect(),
        })
    }

    /// Build a draft for a full update. Identical to [`BusinessDraft::new`]:
    /// every field is replaced, so an omitted set becomes empty.
    ///
    /// # Errors
    ///
    /// Same as [`BusinessDraft::new`].
    pub fn from_full_update(
        name: Option<String>,
        categories: Option<Vec<AttributeId>>,
        services: Option<Vec<AttributeId>>,
    ) -> Result<Self, BizDirError> {
        Self::new(name, categories, services)
    }

    /// The relationship set for `kind`.
    #[must_use]
    pub fn links(&self, kind: AttributeKind) -> &BTreeSet<AttributeId> {
        match kind {
            AttributeKind::Category => &self.categories,
            AttributeKind::Service => &self.services,
        }
    }
}

/// Fields supplied to a partial update. `None` means "keep".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessPatch {
    pub name: Option<String>,
    pub categories: Option<Vec<AttributeId>>,
    pub services: Option<Vec<AttributeId>>,
}

impl BusinessPatch {
    /// Merge this patch over `current`, producing the complete new state.
    ///
    /// A provided set replaces the current one entirely; it is never
    /// appended to.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when a blank name is provided.
    pub fn apply_to(self, current: &Business) -> Result<BusinessDraft, BizDirError> {
        let name = match self.name {
            Some(name) => {
                validate_name(&name)?;
                name
            }
            None => current.name.clone(),
        };
        Ok(BusinessDraft {
            name,
            categories: self.categories.map_or_else(
                || current.categories.clone(),
                |ids| ids.into_iter().collect(),
            ),
            services: self.services.map_or_else(
                || current.services.clone(),
                |ids| ids.into_iter().collect(),
            ),
        })
    }
}

/// Optional restrictions applied when listing businesses.
///
/// Within one set any match qualifies; when both sets are present a business
/// must match both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessFilter {
    pub categories: Option<BTreeSet<AttributeId>>,
    pub services: Option<BTreeSet<AttributeId>>,
}

impl BusinessFilter {
    /// Parse the raw `categories` and `services` query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MalformedIds`] when either list contains a
    /// non-integer item.
    pub fn parse(categories: Option<&str>, services: Option<&str>) -> Result<Self, BizDirError> {
        Ok(Self {
            categories: parse_id_list(AttributeKind::Category.field(), categories)?,
            services: parse_id_list(AttributeKind::Service.field(), services)?,
        })
    }

    /// The restriction for `kind`, if any.
    #[must_use]
    pub fn links(&self, kind: AttributeKind) -> Option<&BTreeSet<AttributeId>> {
        match kind {
            AttributeKind::Category => self.categories.as_ref(),
            AttributeKind::Service => self.services.as_ref(),
        }
    }

    /// Whether `business` passes this filter.
    #[must_use]
    pub fn matches(&self, business: &Business) -> bool {
        [AttributeKind::Category, AttributeKind::Service]
            .into_iter()
            .all(|kind| {
                self.links(kind)
                    .is_none_or(|wanted| !wanted.is_disjoint(business.links(kind)))
            })
    }
}

/// Parse a comma-separated id list. An absent or empty value means "no
/// restriction".
///
/// # Errors
///
/// Returns [`ValidationError::MalformedIds`] keyed by `field` when an item is
/// not an integer.
pub fn parse_id_list(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<BTreeSet<AttributeId>>, BizDirError> {
    let Some(raw) = raw.filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    raw.split(',')
        .map(|item| {
            item.parse::<AttributeId>()
                .map_err(|_| ValidationError::MalformedIds {
                    field,
                    value: raw.to_string(),
                })
        })
        .collect::<Result<BTreeSet<_>, _>>()
        .map(Some)
        .map_err(BizDirError::from)
}

/// A raw image payload as received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Lowercased extension of the client-side file name, if it has one.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        self.filename
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.trim().to_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
    }
}

/// Generate a fresh storage path for a business image.
///
/// The file stem is a random UUID; nothing from the original file name other
/// than `extension` is kept.
#[must_use]
pub fn image_path(extension: &str) -> String {
    format!("{IMAGE_PREFIX}{}.{extension}", uuid::Uuid::new_v4())
}

fn validate_name(name: &str) -> Result<(), BizDirError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName.into());
    }
    Ok(())
}
