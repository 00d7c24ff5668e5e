use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::QueryRejection;
use common::types::ErrorBody;
use thiserror::Error;
use tracing::error;

use service::auth::AuthError;
use service::errors::ServiceError;
use service::pagination::PaginationError;

/// HTTP-facing error: status plus a short machine-readable code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: Some(message.into()) }
    }

    pub fn bare(status: StatusCode, code: &'static str) -> Self {
        Self { status, code, message: None }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation", message)
    }

    pub fn internal() -> Self {
        Self::bare(StatusCode::INTERNAL_SERVER_ERROR, "internal")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.code.to_string(), message: self.message };
        (self.status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(msg) => ApiError::validation(msg),
            AuthError::Conflict => ApiError::new(StatusCode::CONFLICT, "conflict", e.to_string()),
            AuthError::Unauthorized => ApiError::bare(StatusCode::UNAUTHORIZED, "unauthorized"),
            AuthError::Configuration(_) => {
                error!(code = e.code(), err = %e, "auth configuration error");
                ApiError::bare(StatusCode::BAD_REQUEST, "bad_request")
            }
            AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => {
                error!(code = e.code(), err = %e, "auth failure");
                ApiError::internal()
            }
        }
    }
}

impl From<PaginationError> for ApiError {
    fn from(e: PaginationError) -> Self {
        ApiError::validation(e.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => ApiError::validation(msg),
            ServiceError::Pagination(p) => p.into(),
            ServiceError::Db(_) | ServiceError::Model(_) => {
                error!(err = %e, "service failure");
                ApiError::internal()
            }
        }
    }
}

/// Malformed query strings (e.g. `page=abc`) get the same JSON body as other validation failures.
impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        ApiError::validation(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::validation(e.body_text())
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database setup failed: {0}")]
    Database(String),
}
