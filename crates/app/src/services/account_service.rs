//! Account service — registration, token issuance and authentication.

use bizdir_domain::error::{AuthError, BizDirError, ValidationError};
use bizdir_domain::user::{self, NewUser, User};

use crate::ports::{CredentialHasher, UserRepository};

/// Profile fields a user may change about themselves.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Application service for user accounts.
pub struct AccountService<R, H> {
    repo: R,
    hasher: H,
}

impl<R: UserRepository, H: CredentialHasher> AccountService<R, H> {
    /// Create a new service backed by the given repository and hasher.
    pub fn new(repo: R, hasher: H) -> Self {
        Self { repo, hasher }
    }

    /// Register a regular user.
    ///
    /// # Errors
    ///
    /// Returns [`BizDirError::Validation`] for an empty email, a short
    /// password or an already registered email.
    #[tracing::instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, BizDirError> {
        self.create_user(email, password, name, false).await
    }

    /// Register a user with staff and superuser flags set.
    ///
    /// # Errors
    ///
    /// Same as [`Self::register`].
    #[tracing::instrument(skip(self, password))]
    pub async fn create_superuser(&self, email: &str, password: &str) -> Result<User, BizDirError> {
        self.create_user(email, password, "", true).await
    }

    async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        privileged: bool,
    ) -> Result<User, BizDirError> {
        let email = user::normalize_email(email)?;
        user::validate_password(password)?;
        let password_hash = self.hasher.hash_password(password).await?;
        self.repo
            .create(NewUser {
                email,
                name: name.to_string(),
                password_hash,
                is_staff: privileged,
                is_superuser: privileged,
            })
            .await
    }

    /// Exchange credentials for the user's API token, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCredentials`] for an unknown email,
    /// a wrong password or an inactive account.
    #[tracing::instrument(skip(self, password))]
    pub async fn issue_token(&self, email: &str, password: &str) -> Result<String, BizDirError> {
        let email = user::normalize_email(email)?;
        let user = self
            .repo
            .find_by_email(&email)
            .await?
            .filter(|user| user.is_active)
            .ok_or(ValidationError::InvalidCredentials)?;
        if !self
            .hasher
            .verify_password(password, &user.password_hash)
            .await?
        {
            return Err(ValidationError::InvalidCredentials.into());
        }

        let token = self
            .repo
            .get_or_create_token(user.id, self.hasher.generate_token())
            .await?;
        Ok(token.key)
    }

    /// Resolve a token key to an active user.
    ///
    /// # Errors
    ///
    /// Returns [`BizDirError::Unauthorized`] when the key is unknown or the
    /// account is inactive.
    pub async fn authenticate(&self, key: &str) -> Result<User, BizDirError> {
        let user = self
            .repo
            .find_by_token(key)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        if !user.is_active {
            return Err(AuthError::InactiveUser.into());
        }
        Ok(user)
    }

    /// Update the caller's own name and/or password.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PasswordTooShort`] for a short password,
    /// or a storage error.
    #[tracing::instrument(skip_all, fields(user_id = %current.id))]
    pub async fn update_profile(
        &self,
        current: User,
        changes: ProfileChanges,
    ) -> Result<User, BizDirError> {
        let mut updated = current;
        if let Some(name) = changes.name {
            updated.name = name;
        }
        if let Some(password) = changes.password {
            user::validate_password(&password)?;
            updated.password_hash = self.hasher.hash_password(&password).await?;
        }
        self.repo.update(updated).await
    }
}
