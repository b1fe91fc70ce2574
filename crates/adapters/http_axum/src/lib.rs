//! # bizdir-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the JSON API under `/api` (accounts, categories, services,
//!   businesses and image upload)
//! - Resolve the `Authorization: Token <key>` header to the calling user and
//!   pass that user's id explicitly into every service call
//! - Shape business responses through an explicit action → profile mapping
//! - Serve stored images under `/media`
//!
//! ## Dependency rule
//! Depends on `bizdir-app` (for port traits and services) and `bizdir-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod auth;
pub mod error;
pub mod router;
pub mod state;
