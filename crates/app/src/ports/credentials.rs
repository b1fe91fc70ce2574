//! Credential port — password hashing and token generation.

use std::future::Future;

use bizdir_domain::error::BizDirError;

/// Hashes and verifies passwords, and mints opaque API token keys.
///
/// Hashing is CPU-heavy; implementations run it off the async executor.
pub trait CredentialHasher {
    /// Produce a self-describing hash string (salt included) for `password`.
    ///
    /// # Errors
    ///
    /// Returns [`BizDirError::Storage`] if the hashing backend fails.
    fn hash_password(
        &self,
        password: &str,
    ) -> impl Future<Output = Result<String, BizDirError>> + Send;

    /// Check `password` against a hash produced by [`Self::hash_password`].
    /// A malformed hash never verifies.
    ///
    /// # Errors
    ///
    /// Returns [`BizDirError::Storage`] if the hashing backend fails.
    fn verify_password(
        &self,
        password: &str,
        hash: &str,
    ) -> impl Future<Output = Result<bool, BizDirError>> + Send;

    /// Generate a new random token key.
    fn generate_token(&self) -> String;
}
