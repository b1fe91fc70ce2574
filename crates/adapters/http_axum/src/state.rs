//! Shared application state for axum handlers.

use std::sync::Arc;

use bizdir_app::ports::{
    AttributeRepository, BusinessRepository, CredentialHasher, ImageStore, UserRepository,
};
use bizdir_app::services::account_service::AccountService;
use bizdir_app::services::attribute_service::AttributeService;
use bizdir_app::services::business_service::BusinessService;

/// Application state shared across all axum handlers.
///
/// Generic over the user repository, credential hasher, attribute
/// repository, business repository and image store to avoid dynamic
/// dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<UR, CH, AR, BR, IS> {
    /// Registration, tokens and authentication.
    pub account_service: Arc<AccountService<UR, CH>>,
    /// Category and service registry.
    pub attribute_service: Arc<AttributeService<AR>>,
    /// Business CRUD and image upload.
    pub business_service: Arc<BusinessService<BR, AR, IS>>,
}

impl<UR, CH, AR, BR, IS> Clone for AppState<UR, CH, AR, BR, IS> {
    fn clone(&self) -> Self {
        Self {
            account_service: Arc::clone(&self.account_service),
            attribute_service: Arc::clone(&self.attribute_service),
            business_service: Arc::clone(&self.business_service),
        }
    }
}

impl<UR, CH, AR, BR, IS> AppState<UR, CH, AR, BR, IS>
where
    UR: UserRepository + Send + Sync + 'static,
    CH: CredentialHasher + Send + Sync + 'static,
    AR: AttributeRepository + Send + Sync + 'static,
    BR: BusinessRepository + Send + Sync + 'static,
    IS: ImageStore + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(
        account_service: AccountService<UR, CH>,
        attribute_service: AttributeService<AR>,
        business_service: BusinessService<BR, AR, IS>,
    ) -> Self {
        Self {
            account_service: Arc::new(account_service),
            attribute_service: Arc::new(attribute_service),
            business_service: Arc::new(business_service),
        }
    }
}
