//! JSON REST handlers for accounts and API tokens.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use bizdir_app::ports::{
    AttributeRepository, BusinessRepository, CredentialHasher, ImageStore, UserRepository,
};
use bizdir_app::services::account_service::ProfileChanges;
use bizdir_domain::error::ValidationError;
use bizdir_domain::user::User;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for registering a user.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Request body for exchanging credentials for a token.
#[derive(Deserialize)]
pub struct TokenRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for updating the caller's profile.
#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Public view of a user. The password hash never leaves the server.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub email: String,
    pub name: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            name: user.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenView {
    pub token: String,
}

/// Possible responses from the register endpoint.
pub enum RegisterResponse {
    Created(Json<UserView>),
}

impl IntoResponse for RegisterResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the token endpoint.
pub enum TokenResponse {
    Ok(Json<TokenView>),
}

impl IntoResponse for TokenResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the profile endpoints.
pub enum ProfileResponse {
    Ok(Json<UserView>),
}

impl IntoResponse for ProfileResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ApiError> {
    value.ok_or_else(|| ValidationError::Required { field }.into())
}

/// `POST /api/user/create`
pub async fn register<UR, CH, AR, BR, IS>(
    State(state): State<AppState<UR, CH, AR, BR, IS>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<RegisterResponse, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    CH: CredentialHasher + Send + Sync + 'static,
    AR: AttributeRepository + Send + Sync + 'static,
    BR: BusinessRepository + Send + Sync + 'static,
    IS: ImageStore + Send + Sync + 'static,
{
    let Json(req) = payload?;
    let email = required(req.email, "email")?;
    let password = required(req.password, "password")?;
    let user = state
        .account_service
        .register(&email, &password, req.name.as_deref().unwrap_or_default())
        .await?;
    Ok(RegisterResponse::Created(Json(user.into())))
}

/// `POST /api/user/token`
pub async fn issue_token<UR, CH, AR, BR, IS>(
    State(state): State<AppState<UR, CH, AR, BR, IS>>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<TokenResponse, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    CH: CredentialHasher + Send + Sync + 'static,
    AR: AttributeRepository + Send + Sync + 'static,
    BR: BusinessRepository + Send + Sync + 'static,
    IS: ImageStore + Send + Sync + 'static,
{
    let Json(req) = payload?;
    let email = required(req.email, "email")?;
    let password = required(req.password, "password")?;
    let token = state.account_service.issue_token(&email, &password).await?;
    Ok(TokenResponse::Ok(Json(TokenView { token })))
}

/// `GET /api/user/me`
pub async fn me(CurrentUser(user): CurrentUser) -> ProfileResponse {
    ProfileResponse::Ok(Json(user.into()))
}

/// `PATCH /api/user/me`
pub async fn update_me<UR, CH, AR, BR, IS>(
    State(state): State<AppState<UR, CH, AR, BR, IS>>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<ProfileResponse, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    CH: CredentialHasher + Send + Sync + 'static,
    AR: AttributeRepository + Send + Sync + 'static,
    BR: BusinessRepository + Send + Sync + 'static,
    IS: ImageStore + Send + Sync + 'static,
{
    let Json(req) = payload?;
    let updated = state
        .account_service
        .update_profile(
            user,
            ProfileChanges {
                name: req.name,
                password: req.password,
            },
        )
        .await?;
    Ok(ProfileResponse::Ok(Json(updated.into())))
}
