//! Token authentication extractor.
//!
//! Clients send `Authorization: Token <key>`. The resolved [`User`] is what
//! handlers take the owner id from; nothing else about the request decides
//! ownership.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use bizdir_app::ports::{
    AttributeRepository, BusinessRepository, CredentialHasher, ImageStore, UserRepository,
};
use bizdir_domain::error::AuthError;
use bizdir_domain::user::User;

use crate::error::ApiError;
use crate::state::AppState;

const SCHEME: &str = "token";

/// The authenticated caller.
pub struct CurrentUser(pub User);

impl<UR, CH, AR, BR, IS> FromRequestParts<AppState<UR, CH, AR, BR, IS>> for CurrentUser
where
    UR: UserRepository + Send + Sync + 'static,
    CH: CredentialHasher + Send + Sync + 'static,
    AR: AttributeRepository + Send + Sync + 'static,
    BR: BusinessRepository + Send + Sync + 'static,
    IS: ImageStore + Send + Sync + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<UR, CH, AR, BR, IS>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingCredentials)?
            .to_str()
            .map_err(|_| AuthError::MalformedHeader)?;
        let key = token_key(header)?;
        let user = state.account_service.authenticate(key).await?;
        Ok(Self(user))
    }
}

/// Extract the key from an `Authorization` header value.
///
/// A header using another scheme counts as no credentials at all.
fn token_key(header: &str) -> Result<&str, AuthError> {
    let mut parts = header.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::MissingCredentials)?;
    if !scheme.eq_ignore_ascii_case(SCHEME) {
        return Err(AuthError::MissingCredentials);
    }
    match (parts.next(), parts.next()) {
        (Some(key), None) => Ok(key),
        _ => Err(AuthError::MalformedHeader),
    }
}
