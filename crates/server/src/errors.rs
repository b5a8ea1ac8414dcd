use axum::extract::rejection::JsonRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::students::{StudentError, StudentValidationError};
use thiserror::Error;
use tracing::warn;

/// Problem-style JSON error body: `{"status", "title", "detail"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "status": self.status.as_u16(),
            "title": self.title,
            "detail": self.detail,
        });
        (self.status, [(header::CONTENT_TYPE, "application/problem+json")], Json(body)).into_response()
    }
}

/// Validation errors answer with the inner message; dependency and service
/// failures stay opaque 500 problems.
impl From<StudentError> for JsonApiError {
    fn from(err: StudentError) -> Self {
        match err {
            StudentError::Validation(inner @ StudentValidationError::AlreadyExistsStudent(_)) => {
                JsonApiError::new(StatusCode::CONFLICT, "Conflict", Some(inner.to_string()))
            }
            StudentError::Validation(inner @ StudentValidationError::NotFoundStudent { .. }) => {
                JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(inner.to_string()))
            }
            StudentError::Validation(inner) => {
                JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(inner.to_string()))
            }
            StudentError::Dependency(_) | StudentError::Service(_) => {
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Problem", Some(err.to_string()))
            }
        }
    }
}

/// Bodies that are not JSON or carry mistyped fields never reach the service.
impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        let detail = rejection.body_text();
        warn!(status = %rejection.status(), %detail, "rejected request body");
        JsonApiError::new(rejection.status(), "Invalid Body", Some(detail))
    }
}

/// Failures while wiring the server before it accepts requests.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
