//! # bizdir-domain
//!
//! Pure domain model for the bizdir business directory.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Users** and their API tokens
//! - Define **Attributes** (categories and services: owner-scoped tags)
//! - Define **Businesses** and the rules for creating, patching and fully
//!   replacing them, including relationship-set semantics and list filters
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod attribute;
pub mod business;
pub mod user;
