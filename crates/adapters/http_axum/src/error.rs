//! HTTP error response mapping.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use bizdir_domain::error::{AuthError, BizDirError, NotFoundError, ValidationError};

/// JSON error body returned for non-validation failures.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`BizDirError`] to an HTTP response with appropriate status code.
///
/// Validation failures are keyed by the offending field:
/// `{"name": ["This field may not be blank."]}`.
#[derive(Debug)]
pub enum ApiError {
    /// A failure raised by the application layer.
    Domain(BizDirError),
    /// A request body refused by the framework before any handler logic ran.
    Rejected { status: StatusCode, message: String },
}

impl ApiError {
    /// The underlying domain error, if any.
    #[must_use]
    pub fn inner(&self) -> Option<&BizDirError> {
        match self {
            Self::Domain(err) => Some(err),
            Self::Rejected { .. } => None,
        }
    }

    /// A record that does not exist for the caller.
    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::Domain(
            NotFoundError {
                entity,
                id: id.into(),
            }
            .into(),
        )
    }

    /// An unreadable request body. Oversized bodies keep their 413 status,
    /// anything else is reported as a malformed body.
    fn body_rejected(status: StatusCode, detail: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            Self::Rejected {
                status,
                message: detail,
            }
        } else {
            ValidationError::MalformedBody { detail }.into()
        }
    }
}

impl From<BizDirError> for ApiError {
    fn from(err: BizDirError) -> Self {
        Self::Domain(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Domain(err.into())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Domain(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::body_rejected(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::body_rejected(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::body_rejected(err.status(), err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            Self::Domain(err) => err,
            Self::Rejected { status, message } => return error_response(status, message),
        };
        match &err {
            BizDirError::Validation(err) => {
                let body = BTreeMap::from([(err.field(), vec![err.to_string()])]);
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            BizDirError::NotFound(err) => error_response(StatusCode::NOT_FOUND, err.to_string()),
            BizDirError::Unauthorized(err) => {
                let mut response = error_response(StatusCode::UNAUTHORIZED, err.to_string());
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Token"));
                response
            }
            BizDirError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}
