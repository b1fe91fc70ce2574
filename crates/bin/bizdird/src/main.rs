//! # bizdird — bizdir daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`bizdir.toml`, env vars)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository, hasher and media adapters
//! - Construct application services, injecting adapters via port traits
//! - Optionally bootstrap an administrator account
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (Ctrl-C)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use bizdir_adapter_auth_argon2::Argon2Hasher;
use bizdir_adapter_http_axum::router::{self, RouterOptions};
use bizdir_adapter_http_axum::state::AppState;
use bizdir_adapter_media_fs::FsImageStore;
use bizdir_adapter_storage_sqlite_sqlx::{
    Config as DatabaseConfig, SqliteAttributeRepository, SqliteBusinessRepository,
    SqliteUserRepository,
};
use bizdir_app::ports::{CredentialHasher, UserRepository};
use bizdir_app::services::account_service::AccountService;
use bizdir_app::services::attribute_service::AttributeService;
use bizdir_app::services::business_service::BusinessService;
use bizdir_domain::error::{BizDirError, ValidationError};
use tracing_subscriber::EnvFilter;

use crate::config::{AdminConfig, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    // Logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = DatabaseConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Adapters
    let user_repo = SqliteUserRepository::new(pool.clone());
    let attribute_repo = SqliteAttributeRepository::new(pool.clone());
    let business_repo = SqliteBusinessRepository::new(pool);
    std::fs::create_dir_all(&config.media.root)?;
    let image_store = FsImageStore::new(config.media.root.clone());

    // Services
    let account_service = AccountService::new(user_repo, Argon2Hasher::new());
    bootstrap_admin(&account_service, &config.admin).await?;
    let attribute_service = AttributeService::new(attribute_repo.clone());
    let business_service = BusinessService::new(business_repo, attribute_repo, image_store);

    // HTTP
    let state = AppState::new(account_service, attribute_service, business_service);
    let app = router::build(
        state,
        &RouterOptions {
            media_root: config.media.root.clone(),
            max_upload_bytes: config.media.max_upload_bytes,
        },
    );

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "bizdird listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("bizdird stopped");
    Ok(())
}

/// Create the configured superuser unless that email is already registered.
async fn bootstrap_admin<R, H>(
    accounts: &AccountService<R, H>,
    admin: &AdminConfig,
) -> Result<(), BizDirError>
where
    R: UserRepository,
    H: CredentialHasher,
{
    let Some((email, password)) = admin.credentials() else {
        return Ok(());
    };
    match accounts.create_superuser(email, password).await {
        Ok(user) => {
            tracing::info!(email = %user.email, "created administrator account");
            Ok(())
        }
        Err(BizDirError::Validation(ValidationError::EmailTaken)) => {
            tracing::debug!(%email, "administrator account already exists");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
