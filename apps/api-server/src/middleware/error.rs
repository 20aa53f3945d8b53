//! Error handling - converts failures into the JSON failure envelope.

use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use quill_shared::ErrorResponse;
use std::fmt;

use quill_core::error::{DomainError, RepoError};
use quill_core::ports::StorageError;

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    /// Entity absent on a single-item read.
    NotFound(String),
    /// Generic failure carrying the underlying message.
    BadRequest(String),
    Conflict(String),
    PayloadTooLarge(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail)
            | AppError::Conflict(detail)
            | AppError::PayloadTooLarge(detail) => ErrorResponse::failure(detail),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
        }
    }
}

/// Write paths report a missing id as a generic failure; reads produce
/// [`AppError::NotFound`] themselves.
impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(domain) => domain.into(),
            RepoError::NotFound => AppError::BadRequest("Record to modify not found".to_string()),
            RepoError::Constraint(msg) => {
                tracing::warn!("Constraint violation: {}", msg);
                AppError::BadRequest(msg)
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::BadRequest(msg)
            }
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database unavailable".to_string())
            }
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::EmptyPayload | StorageError::InvalidKey(_) => {
                AppError::BadRequest(err.to_string())
            }
            StorageError::NotFound(_) | StorageError::Backend(_) => {
                tracing::error!("Thumbnail storage error: {}", err);
                AppError::BadRequest(format!("Upload failed: {err}"))
            }
        }
    }
}

/// Turn JSON body extraction failures into the failure envelope.
pub fn json_error_handler(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    use actix_web::error::JsonPayloadError;

    match err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            AppError::PayloadTooLarge(err.to_string()).into()
        }
        other => AppError::BadRequest(other.to_string()).into(),
    }
}

/// Turn path parameter failures (e.g. a non-numeric id) into the failure envelope.
pub fn path_error_handler(err: actix_web::error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

/// Turn raw body failures (e.g. an oversized upload) into the failure envelope.
pub fn payload_error_handler(err: actix_web::error::PayloadError) -> AppError {
    match err {
        actix_web::error::PayloadError::Overflow => AppError::PayloadTooLarge(err.to_string()),
        other => AppError::BadRequest(other.to_string()),
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
