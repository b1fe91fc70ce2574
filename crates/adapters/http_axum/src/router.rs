//! Axum router assembly.

use std::path::PathBuf;

use axum::Router;
use axum::routing::get;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use bizdir_app::ports::{
    AttributeRepository, BusinessRepository, CredentialHasher, ImageStore, UserRepository,
};

use crate::state::AppState;

/// Settings that shape the router but are not application state.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Directory stored images are served from under `/media`.
    pub media_root: PathBuf,
    /// Largest accepted image upload request body, in bytes.
    pub max_upload_bytes: usize,
}

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api` and serves stored media under `/media`.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<UR, CH, AR, BR, IS>(
    state: AppState<UR, CH, AR, BR, IS>,
    options: &RouterOptions,
) -> Router
where
    UR: UserRepository + Send + Sync + 'static,
    CH: CredentialHasher + Send + Sync + 'static,
    AR: AttributeRepository + Send + Sync + 'static,
    BR: BusinessRepository + Send + Sync + 'static,
    IS: ImageStore + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes(options.max_upload_bytes))
        .nest_service("/media", ServeDir::new(&options.media_root))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
