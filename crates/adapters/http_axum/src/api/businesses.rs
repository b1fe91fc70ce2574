//! JSON REST handlers for businesses.
//!
//! Which shape a business is rendered in depends only on the action being
//! served; see [`BusinessAction::profile`].

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use bizdir_app::ports::{
    AttributeRepository, BusinessRepository, CredentialHasher, ImageStore, UserRepository,
};
use bizdir_domain::business::{
    Business, BusinessDetail, BusinessDraft, BusinessFilter, BusinessPatch, ImageUpload,
};
use bizdir_domain::error::{BizDirError, ValidationError};
use bizdir_domain::id::{AttributeId, BusinessId, UserId};

use crate::api::attributes::AttributeView;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Multipart field carrying the uploaded image.
const IMAGE_FIELD: &str = "image";

/// The operation a business response is produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessAction {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    UploadImage,
}

/// Output shape of a business.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// `{id, name, categories: [id], services: [id]}`
    Summary,
    /// `{id, name, image, categories: [{id, name}], services: [{id, name}]}`
    Detail,
    /// `{id, image}`
    Image,
}

impl BusinessAction {
    #[must_use]
    pub const fn profile(self) -> Profile {
        match self {
            Self::List | Self::Create | Self::Update | Self::PartialUpdate => Profile::Summary,
            Self::Retrieve => Profile::Detail,
            Self::UploadImage => Profile::Image,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryView {
    pub id: i64,
    pub name: String,
    pub categories: Vec<i64>,
    pub services: Vec<i64>,
}

impl From<Business> for SummaryView {
    fn from(business: Business) -> Self {
        Self {
            id: business.id.as_i64(),
            name: business.name,
            categories: business.categories.iter().map(|id| id.as_i64()).collect(),
            services: business.services.iter().map(|id| id.as_i64()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DetailView {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub categories: Vec<AttributeView>,
    pub services: Vec<AttributeView>,
}

impl From<BusinessDetail> for DetailView {
    fn from(detail: BusinessDetail) -> Self {
        Self {
            id: detail.business.id.as_i64(),
            name: detail.business.name,
            image: detail.business.image,
            categories: detail.categories.into_iter().map(AttributeView::from).collect(),
            services: detail.services.into_iter().map(AttributeView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImageView {
    pub id: i64,
    pub image: Option<String>,
}

impl From<Business> for ImageView {
    fn from(business: Business) -> Self {
        Self {
            id: business.id.as_i64(),
            image: business.image,
        }
    }
}

/// A business rendered in one of the [`Profile`] shapes.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BusinessView {
    Summary(SummaryView),
    Detail(DetailView),
    Image(ImageView),
}

/// Render `business` in the profile `action` calls for.
async fn present<UR, CH, AR, BR, IS>(
    state: &AppState<UR, CH, AR, BR, IS>,
    owner: UserId,
    action: BusinessAction,
    business: Business,
) -> Result<BusinessView, BizDirError>
where
    UR: UserRepository + Send + Sync + 'static,
    CH: CredentialHasher + Send + Sync + 'static,
    AR: AttributeRepository + Send + Sync + 'static,
    BR: BusinessRepository + Send + Sync + 'static,
    IS: ImageStore + Send + Sync + 'static,
{
    Ok(match action.profile() {
        Profile::Summary => BusinessView::Summary(business.into()),
        Profile::Image => BusinessView::Image(business.into()),
        Profile::Detail => {
            let detail = state
                .business_service
                .expand_business(owner, business)
                .await?;
            BusinessView::Detail(detail.into())
        }
    })
}

/// Query parameters accepted by the list endpoint.
#[derive(Deserialize)]
pub struct ListQuery {
    pub categories: Option<String>,
    pub services: Option<String>,
}

/// Request body for create, full update and partial update.
#[derive(Deserialize)]
pub struct BusinessRequest {
    pub name: Option<String>,
    pub categories: Option<Vec<AttributeId>>,
    pub services: Option<Vec<AttributeId>>,
}

/// Possible responses from the business endpoints.
pub enum BusinessResponse {
    Ok(Json<BusinessView>),
    Created(Json<BusinessView>),
}

impl IntoResponse for BusinessResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<BusinessView>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// A path segment that is not an integer cannot name any business.
fn parse_id(raw: &str) -> Result<BusinessId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::not_found("Business", raw))
}

/// `GET /api/businesses`
pub async fn list<UR, CH, AR, BR, IS>(
    State(state): State<AppState<UR, CH, AR, BR, IS>>,
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
    let filter = BusinessFilter::parse(query.categories.as_deref(), query.services.as_deref())?;
    let businesses = state
        .business_service
        .list_businesses(user.id, &filter)
        .await?;

    let mut views = Vec::with_capacity(businesses.len());
    for business in businesses {
        views.push(present(&state, user.id, BusinessAction::List, business).await?);
    }
    Ok(ListResponse::Ok(Json(views)))
}

/// `GET /api/businesses/{id}`
pub async fn get<UR, CH, AR, BR, IS>(
    State(state): State<AppState<UR, CH, AR, BR, IS>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<BusinessResponse, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    CH: CredentialHasher + Send + Sync + 'static,
    AR: AttributeRepository + Send + Sync + 'static,
    BR: BusinessRepository + Send + Sync + 'static,
    IS: ImageStore + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let business = state.business_service.get_business(user.id, id).await?;
    let view = present(&state, user.id, BusinessAction::Retrieve, business).await?;
    Ok(BusinessResponse::Ok(Json(view)))
}

/// `POST /api/businesses`
pub async fn create<UR, CH, AR, BR, IS>(
    State(state): State<AppState<UR, CH, AR, BR, IS>>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<BusinessRequest>, JsonRejection>,
) -> Result<BusinessResponse, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    CH: CredentialHasher + Send + Sync + 'static,
    AR: AttributeRepository + Send + Sync + 'static,
    BR: BusinessRepository + Send + Sync + 'static,
    IS: ImageStore + Send + Sync + 'static,
{
    let Json(req) = payload?;
    let draft = BusinessDraft::new(req.name, req.categories, req.services)?;
    let created = state.business_service.create_business(user.id, draft).await?;
    let view = present(&state, user.id, BusinessAction::Create, created).await?;
    Ok(BusinessResponse::Created(Json(view)))
}

/// `PUT /api/businesses/{id}`
///
/// Every writable field is replaced; an omitted relationship list clears it.
pub async fn update<UR, CH, AR, BR, IS>(
    State(state): State<AppState<UR, CH, AR, BR, IS>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<BusinessRequest>, JsonRejection>,
) -> Result<BusinessResponse, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    CH: CredentialHasher + Send + Sync + 'static,
    AR: AttributeRepository + Send + Sync + 'static,
    BR: BusinessRepository + Send + Sync + 'static,
    IS: ImageStore + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    state.business_service.get_business(user.id, id).await?;
    let Json(req) = payload?;
    let draft = BusinessDraft::from_full_update(req.name, req.categories, req.services)?;
    let updated = state
        .business_service
        .update_business(user.id, id, draft)
        .await?;
    let view = present(&state, user.id, BusinessAction::Update, updated).await?;
    Ok(BusinessResponse::Ok(Json(view)))
}

/// `PATCH /api/businesses/{id}`
///
/// Only provided fields change; a provided relationship list replaces the
/// whole set.
pub async fn partial_update<UR, CH, AR, BR, IS>(
    State(state): State<AppState<UR, CH, AR, BR, IS>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<BusinessRequest>, JsonRejection>,
) -> Result<BusinessResponse, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    CH: CredentialHasher + Send + Sync + 'static,
    AR: AttributeRepository + Send + Sync + 'static,
    BR: BusinessRepository + Send + Sync + 'static,
    IS: ImageStore + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let Json(req) = payload?;
    let patch = BusinessPatch {
        name: req.name,
        categories: req.categories,
        services: req.services,
    };
    let updated = state
        .business_service
        .patch_business(user.id, id, patch)
        .await?;
    let view = present(&state, user.id, BusinessAction::PartialUpdate, updated).await?;
    Ok(BusinessResponse::Ok(Json(view)))
}

/// `DELETE /api/businesses/{id}`
pub async fn delete<UR, CH, AR, BR, IS>(
    State(state): State<AppState<UR, CH, AR, BR, IS>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    CH: CredentialHasher + Send + Sync + 'static,
    AR: AttributeRepository + Send + Sync + 'static,
    BR: BusinessRepository + Send + Sync + 'static,
    IS: ImageStore + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    state.business_service.delete_business(user.id, id).await?;
    Ok(DeleteResponse::NoContent)
}

/// `POST /api/businesses/{id}/upload-image`
pub async fn upload_image<UR, CH, AR, BR, IS>(
    State(state): State<AppState<UR, CH, AR, BR, IS>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<BusinessResponse, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    CH: CredentialHasher + Send + Sync + 'static,
    AR: AttributeRepository + Send + Sync + 'static,
    BR: BusinessRepository + Send + Sync + 'static,
    IS: ImageStore + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    state.business_service.get_business(user.id, id).await?;

    let mut multipart = multipart?;
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;
        upload = Some(ImageUpload {
            filename,
            bytes: bytes.to_vec(),
        });
        break;
    }
    let upload = upload.ok_or(ValidationError::Required { field: IMAGE_FIELD })?;

    let updated = state
        .business_service
        .upload_image(user.id, id, upload)
        .await?;
    let view = present(&state, user.id, BusinessAction::UploadImage, updated).await?;
    Ok(BusinessResponse::Ok(Json(view)))
}
