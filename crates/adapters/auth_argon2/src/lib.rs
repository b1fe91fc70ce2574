//! # bizdir-adapter-auth-argon2
//!
//! Implements the `CredentialHasher` port from `bizdir-app`:
//! - passwords are hashed with argon2id and a random salt, stored in PHC
//!   string format; hashing and verification run on the blocking pool
//! - token keys are 40 lowercase hex characters drawn from the OS RNG

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::RngCore;
use rand::rngs::OsRng;

use bizdir_app::ports::CredentialHasher;
use bizdir_domain::error::BizDirError;

/// Number of random bytes behind a token key.
const TOKEN_BYTES: usize = 20;

/// Errors raised by the hashing backend.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("password hashing failed: {0}")]
    Hash(argon2::password_hash::Error),

    #[error("hashing task failed")]
    Join(#[from] tokio::task::JoinError),
}

impl From<HashError> for BizDirError {
    fn from(err: HashError) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// Argon2-backed [`CredentialHasher`].
#[derive(Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2Hasher {
    async fn hash_password(&self, password: &str) -> Result<String, BizDirError> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();
        let hash = tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
        })
        .await
        .map_err(HashError::from)?
        .map_err(HashError::Hash)?;
        Ok(hash)
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, BizDirError> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();
        let verified = tokio::task::spawn_blocking(move || {
            PasswordHash::new(&hash).is_ok_and(|parsed| {
                argon2
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
        })
        .await
        .map_err(HashError::from)?;
        Ok(verified)
    }

    fn generate_token(&self) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}
