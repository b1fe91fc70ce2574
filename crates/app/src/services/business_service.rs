//! Business service — use-cases for the business aggregate.

use bizdir_domain::attribute::AttributeKind;
use bizdir_domain::business::{
    Business, BusinessDetail, BusinessDraft, BusinessFilter, BusinessPatch, ImageUpload,
};
use bizdir_domain::error::{BizDirError, NotFoundError, ValidationError};
use bizdir_domain::id::{BusinessId, UserId};

use crate::ports::{AttributeRepository, BusinessRepository, ImageStore};

/// Application service for owner-scoped business CRUD and image upload.
pub struct BusinessService<B, A, I> {
    businesses: B,
    attributes: A,
    images: I,
}

fn not_found(id: BusinessId) -> BizDirError {
    NotFoundError {
        entity: "Business",
        id: id.to_string(),
    }
    .into()
}

impl<B, A, I> BusinessService<B, A, I>
where
    B: BusinessRepository,
    A: AttributeRepository,
    I: ImageStore,
{
    /// Create a new service backed by the given repositories and image store.
    pub fn new(businesses: B, attributes: A, images: I) -> Self {
        Self {
            businesses,
            attributes,
            images,
        }
    }

    /// List the owner's businesses matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn list_businesses(
        &self,
        owner: UserId,
        filter: &BusinessFilter,
    ) -> Result<Vec<Business>, BizDirError> {
        self.businesses.list(owner, filter).await
    }

    /// Look up one of the owner's businesses.
    ///
    /// # Errors
    ///
    /// Returns [`BizDirError::NotFound`] when the id is unknown or belongs to
    /// another owner, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn get_business(&self, owner: UserId, id: BusinessId) -> Result<Business, BizDirError> {
        self.businesses
            .get_by_id(owner, id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Look up one of the owner's businesses with categories and services
    /// resolved to full records.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_business`].
    #[tracing::instrument(skip(self))]
    pub async fn get_business_detail(
        &self,
        owner: UserId,
        id: BusinessId,
    ) -> Result<BusinessDetail, BizDirError> {
        let business = self.get_business(owner, id).await?;
        self.expand_business(owner, business).await
    }

    /// Resolve the relationship sets of an already loaded business.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn expand_business(
        &self,
        owner: UserId,
        business: Business,
    ) -> Result<BusinessDetail, BizDirError> {
        let categories = self
            .attributes
            .find_by_ids(owner, AttributeKind::Category, &business.categories)
            .await?;
        let services = self
            .attributes
            .find_by_ids(owner, AttributeKind::Service, &business.services)
            .await?;
        Ok(BusinessDetail {
            business,
            categories,
            services,
        })
    }

    /// Create a business owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownReference`] when a referenced
    /// category or service is not one of the owner's, or a storage error.
    #[tracing::instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_business(
        &self,
        owner: UserId,
        draft: BusinessDraft,
    ) -> Result<Business, BizDirError> {
        self.check_references(owner, &draft).await?;
        self.businesses.create(owner, draft).await
    }

    /// Replace every writable field of a business (full update).
    ///
    /// # Errors
    ///
    /// Returns [`BizDirError::NotFound`] for an invisible business,
    /// [`ValidationError::UnknownReference`] for foreign references, or a
    /// storage error.
    #[tracing::instrument(skip(self, draft))]
    pub async fn update_business(
        &self,
        owner: UserId,
        id: BusinessId,
        draft: BusinessDraft,
    ) -> Result<Business, BizDirError> {
        // Ownership before references: a foreign id is always NotFound.
        self.get_business(owner, id).await?;
        self.check_references(owner, &draft).await?;
        self.businesses
            .update(owner, id, draft)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Apply a partial update to a business.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update_business`].
    #[tracing::instrument(skip(self, patch))]
    pub async fn patch_business(
        &self,
        owner: UserId,
        id: BusinessId,
        patch: BusinessPatch,
    ) -> Result<Business, BizDirError> {
        let current = self.get_business(owner, id).await?;
        let draft = patch.apply_to(&current)?;
        self.check_references(owner, &draft).await?;
        self.businesses
            .update(owner, id, draft)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Delete a business. Its categories and services are kept.
    ///
    /// # Errors
    ///
    /// Returns [`BizDirError::NotFound`] for an invisible business, or a
    /// storage error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_business(&self, owner: UserId, id: BusinessId) -> Result<(), BizDirError> {
        if self.businesses.delete(owner, id).await? {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }

    /// Store an image and attach it to a business.
    ///
    /// # Errors
    ///
    /// Returns [`BizDirError::NotFound`] for an invisible business,
    /// [`ValidationError::InvalidImage`] for an undecodable payload (the
    /// current image is left untouched), or a storage error.
    #[tracing::instrument(skip(self, upload), fields(bytes = upload.bytes.len()))]
    pub async fn upload_image(
        &self,
        owner: UserId,
        id: BusinessId,
        upload: ImageUpload,
    ) -> Result<Business, BizDirError> {
        let previous = self.get_business(owner, id).await?.image;
        let path = self.images.save(upload).await?;
        tracing::debug!(%path, "stored business image");

        let updated = match self.businesses.set_image(owner, id, path.clone()).await {
            Ok(Some(business)) => business,
            Ok(None) => {
                self.discard_image(&path).await;
                return Err(not_found(id));
            }
            Err(err) => {
                self.discard_image(&path).await;
                return Err(err);
            }
        };
        if let Some(previous) = previous
            && previous != path
        {
            self.discard_image(&previous).await;
        }
        Ok(updated)
    }

    /// Best-effort removal of an image no business points to anymore.
    async fn discard_image(&self, path: &str) {
        if let Err(err) = self.images.remove(path).await {
            tracing::warn!(%path, error = %err, "failed to remove orphaned image");
        }
    }

    async fn check_references(
        &self,
        owner: UserId,
        draft: &BusinessDraft,
    ) -> Result<(), BizDirError> {
        for kind in [AttributeKind::Category, AttributeKind::Service] {
            let wanted = draft.links(kind);
            if wanted.is_empty() {
                continue;
            }
            let found = self.attributes.find_by_ids(owner, kind, wanted).await?;
            if let Some(missing) = wanted
                .iter()
                .find(|id| !found.iter().any(|attribute| attribute.id == **id))
            {
                return Err(ValidationError::UnknownReference {
                    field: kind.field(),
                    id: missing.as_i64(),
                }
                .into());
            }
        }
        Ok(())
    }
}
