//! Attribute service — use-cases for categories and services.

use bizdir_domain::attribute::{Attribute, AttributeKind, NewAttribute};
use bizdir_domain::error::BizDirError;
use bizdir_domain::id::UserId;

use crate::ports::AttributeRepository;

/// Application service for listing and creating owner-scoped attributes.
pub struct AttributeService<R> {
    repo: R,
}

impl<R: AttributeRepository> AttributeService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// List the owner's attributes of `kind`, ordered by name descending.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn list_attributes(
        &self,
        owner: UserId,
        kind: AttributeKind,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>, BizDirError> {
        self.repo.list(owner, kind, assigned_only).await
    }

    /// Create an attribute owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`BizDirError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, attribute), fields(kind = %attribute.kind))]
    pub async fn create_attribute(
        &self,
        owner: UserId,
        attribute: NewAttribute,
    ) -> Result<Attribute, BizDirError> {
        self.repo.create(owner, attribute).await
    }
}
