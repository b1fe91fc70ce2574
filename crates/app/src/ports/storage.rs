//! Storage ports — repository traits for persistence.
//!
//! Every method touching categories, services or businesses takes the owner
//! id explicitly and must restrict both reads and writes to that owner.
//! Records of other owners behave exactly like missing ones.

use std::collections::BTreeSet;
use std::future::Future;

use bizdir_domain::attribute::{Attribute, AttributeKind, NewAttribute};
use bizdir_domain::business::{Business, BusinessDraft, BusinessFilter};
use bizdir_domain::error::BizDirError;
use bizdir_domain::id::{AttributeId, BusinessId, UserId};
use bizdir_domain::user::{AuthToken, NewUser, User};

/// Repository for accounts and their API tokens.
pub trait UserRepository {
    /// Persist a new user.
    ///
    /// Fails with `ValidationError::EmailTaken` when the email is already
    /// registered.
    fn create(&self, user: NewUser) -> impl Future<Output = Result<User, BizDirError>> + Send;

    /// Get a user by id.
    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, BizDirError>> + Send;

    /// Find a user by normalized email.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, BizDirError>> + Send;

    /// Overwrite the mutable profile fields of an existing user.
    fn update(&self, user: User) -> impl Future<Output = Result<User, BizDirError>> + Send;

    /// Return the user's token, storing `candidate_key` as a new one if the
    /// user has none yet.
    fn get_or_create_token(
        &self,
        user_id: UserId,
        candidate_key: String,
    ) -> impl Future<Output = Result<AuthToken, BizDirError>> + Send;

    /// Resolve a token key to the user it belongs to.
    fn find_by_token(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<User>, BizDirError>> + Send;
}

/// Repository for categories and services.
pub trait AttributeRepository {
    /// Persist a new attribute owned by `owner`.
    fn create(
        &self,
        owner: UserId,
        attribute: NewAttribute,
    ) -> impl Future<Output = Result<Attribute, BizDirError>> + Send;

    /// List the owner's attributes of `kind`, ordered by name descending.
    ///
    /// With `assigned_only`, keep only attributes linked to at least one of
    /// the owner's businesses.
    fn list(
        &self,
        owner: UserId,
        kind: AttributeKind,
        assigned_only: bool,
    ) -> impl Future<Output = Result<Vec<Attribute>, BizDirError>> + Send;

    /// Resolve ids to the owner's attributes of `kind`, ordered by id.
    /// Ids that do not resolve are silently skipped.
    fn find_by_ids(
        &self,
        owner: UserId,
        kind: AttributeKind,
        ids: &BTreeSet<AttributeId>,
    ) -> impl Future<Output = Result<Vec<Attribute>, BizDirError>> + Send;
}

/// Repository for the business aggregate and its relationship rows.
pub trait BusinessRepository {
    /// Persist a new business and its relationship rows.
    fn create(
        &self,
        owner: UserId,
        draft: BusinessDraft,
    ) -> impl Future<Output = Result<Business, BizDirError>> + Send;

    /// Get one of the owner's businesses.
    fn get_by_id(
        &self,
        owner: UserId,
        id: BusinessId,
    ) -> impl Future<Output = Result<Option<Business>, BizDirError>> + Send;

    /// List the owner's businesses matching `filter`, ordered by name
    /// descending.
    fn list(
        &self,
        owner: UserId,
        filter: &BusinessFilter,
    ) -> impl Future<Output = Result<Vec<Business>, BizDirError>> + Send;

    /// Replace name and both relationship sets. The image is kept.
    /// Returns `None` when the business is not visible to `owner`.
    fn update(
        &self,
        owner: UserId,
        id: BusinessId,
        draft: BusinessDraft,
    ) -> impl Future<Output = Result<Option<Business>, BizDirError>> + Send;

    /// Point the business at a stored image path.
    /// Returns `None` when the business is not visible to `owner`.
    fn set_image(
        &self,
        owner: UserId,
        id: BusinessId,
        path: String,
    ) -> impl Future<Output = Result<Option<Business>, BizDirError>> + Send;

    /// Delete a business and its relationship rows (never the attributes).
    /// Returns `false` when the business is not visible to `owner`.
    fn delete(
        &self,
        owner: UserId,
        id: BusinessId,
    ) -> impl Future<Output = Result<bool, BizDirError>> + Send;
}
