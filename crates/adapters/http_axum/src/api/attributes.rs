//! JSON REST handlers for categories and services.
//!
//! Both resources share these handlers; the route layer injects the
//! [`AttributeKind`] as a request extension.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use bizdir_app::ports::{
    AttributeRepository, BusinessRepository, CredentialHasher, ImageStore, UserRepository,
};
use bizdir_domain::attribute::{Attribute, AttributeKind, NewAttribute};
use bizdir_domain::error::ValidationError;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters accepted by the list endpoint.
#[derive(Deserialize)]
pub struct ListQuery {
    pub assigned_only: Option<String>,
}

impl ListQuery {
    /// `0` or absent means false, any other integer means true.
    fn assigned_only(&self) -> Result<bool, ValidationError> {
        match self.assigned_only.as_deref().map(str::trim) {
            None | Some("") => Ok(false),
            Some(raw) => raw
                .parse::<i64>()
                .map(|value| value != 0)
                .map_err(|_| ValidationError::MalformedFlag {
                    field: "assigned_only",
                    value: raw.to_string(),
                }),
        }
    }
}

/// Request body for creating a category or service.
#[derive(Deserialize)]
pub struct CreateAttributeRequest {
    pub name: Option<String>,
}

/// Wire shape of a category or service.
#[derive(Debug, Serialize)]
pub struct AttributeView {
    pub id: i64,
    pub name: String,
}

impl From<Attribute> for AttributeView {
    fn from(attribute: Attribute) -> Self {
        Self {
            id: attribute.id.as_i64(),
            name: attribute.name,
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<AttributeView>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<AttributeView>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `GET /api/categories`, `GET /api/services`
pub async fn list<UR, CH, AR, BR, IS>(
    State(state): State<AppState<UR, CH, AR, BR, IS>>,
    Extension(kind): Extension<AttributeKind>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<ListResponse, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    CH: CredentialHasher + Send + Sync + 'static,
    AR: AttributeRepository + Send + Sync + 'static,
    BR: BusinessRepository + Send + Sync + 'static,
    IS: ImageStore + Send + Sync + 'static,
{
    let assigned_only = query.assigned_only()?;
    let attributes = state
        .attribute_service
        .list_attributes(user.id, kind, assigned_only)
        .await?;
    Ok(ListResponse::Ok(Json(
        attributes.into_iter().map(AttributeView::from).collect(),
    )))
}

/// `POST /api/categories`, `POST /api/services`
pub async fn create<UR, CH, AR, BR, IS>(
    State(state): State<AppState<UR, CH, AR, BR, IS>>,
    Extension(kind): Extension<AttributeKind>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<CreateAttributeRequest>, JsonRejection>,
) -> Result<CreateResponse, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    CH: CredentialHasher + Send + Sync + 'static,
    AR: AttributeRepository + Send + Sync + 'static,
    BR: BusinessRepository + Send + Sync + 'static,
    IS: ImageStore + Send + Sync + 'static,
{
    let Json(req) = payload?;
    let attribute = NewAttribute::new(kind, req.name)?;
    let created = state
        .attribute_service
        .create_attribute(user.id, attribute)
        .await?;
    Ok(CreateResponse::Created(Json(created.into())))
}
