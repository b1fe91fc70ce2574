//! # bizdir-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `UserRepository` — accounts and API tokens
//!   - `AttributeRepository` — owner-scoped categories and services
//!   - `BusinessRepository` — owner-scoped businesses and their relationship rows
//!   - `ImageStore` — blob storage for uploaded images
//!   - `CredentialHasher` — password hashing and token generation
//! - Define **driving/inbound ports** as use-case structs:
//!   - `AccountService` — register, issue token, authenticate, update profile
//!   - `AttributeService` — list and create categories/services
//!   - `BusinessService` — list, filter, get, create, update, patch, delete, upload image
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `bizdir-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
