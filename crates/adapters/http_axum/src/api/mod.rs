//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod attributes;
#[allow(clippy::missing_errors_doc)]
pub mod businesses;
#[allow(clippy::missing_errors_doc)]
pub mod users;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Extension, Router};

use bizdir_app::ports::{
    AttributeRepository, BusinessRepository, CredentialHasher, ImageStore, UserRepository,
};
use bizdir_domain::attribute::AttributeKind;

use crate::state::AppState;

/// Build the `/api` sub-router.
///
/// `max_upload_bytes` caps the request body of the image upload endpoint.
pub fn routes<UR, CH, AR, BR, IS>(max_upload_bytes: usize) -> Router<AppState<UR, CH, AR, BR, IS>>
where
    UR: UserRepository + Send + Sync + 'static,
    CH: CredentialHasher + Send + Sync + 'static,
    AR: AttributeRepository + Send + Sync + 'static,
    BR: BusinessRepository + Send + Sync + 'static,
    IS: ImageStore + Send + Sync + 'static,
{
    Router::new()
        // Accounts
        .route("/user/create", post(users::register::<UR, CH, AR, BR, IS>))
        .route("/user/token", post(users::issue_token::<UR, CH, AR, BR, IS>))
        .route(
            "/user/me",
            get(users::me).patch(users::update_me::<UR, CH, AR, BR, IS>),
        )
        // Categories
        .route(
            "/categories",
            get(attributes::list::<UR, CH, AR, BR, IS>)
                .post(attributes::create::<UR, CH, AR, BR, IS>)
                .layer(Extension(AttributeKind::Category)),
        )
        // Services
        .route(
            "/services",
            get(attributes::list::<UR, CH, AR, BR, IS>)
                .post(attributes::create::<UR, CH, AR, BR, IS>)
                .layer(Extension(AttributeKind::Service)),
        )
        // Businesses
        .route(
            "/businesses",
            get(businesses::list::<UR, CH, AR, BR, IS>)
                .post(businesses::create::<UR, CH, AR, BR, IS>),
        )
        .route(
            "/businesses/{id}",
            get(businesses::get::<UR, CH, AR, BR, IS>)
                .put(businesses::update::<UR, CH, AR, BR, IS>)
                .patch(businesses::partial_update::<UR, CH, AR, BR, IS>)
                .delete(businesses::delete::<UR, CH, AR, BR, IS>),
        )
        .route(
            "/businesses/{id}/upload-image",
            post(businesses::upload_image::<UR, CH, AR, BR, IS>)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}
