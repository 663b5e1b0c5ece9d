//! API error type
//!
//! Every failure maps onto the shared `{ code, message }` envelope with an
//! appropriate status code. Database errors are logged and returned with a
//! generic message so internals never leak to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use cortado_core::response::{codes, ErrorBody};

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// API errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("internal server error")]
    Internal(String),

    #[error("not implemented")]
    NotImplemented,
}

impl ApiError {
    pub fn validation<T: Into<String>>(message: T) -> Self {
        ApiError::Validation(message.into())
    }

    /// The stock 401 used by the auth middleware.
    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("Invalid or missing authentication token".to_string())
    }

    pub fn unauthorized_with<T: Into<String>>(message: T) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden<T: Into<String>>(message: T) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn conflict<T: Into<String>>(message: T) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal<T: Into<String>>(message: T) -> Self {
        ApiError::Internal(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, codes::VALIDATION_ERROR),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, codes::AUTHENTICATION_ERROR),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, codes::FORBIDDEN),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, codes::NOT_FOUND),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, codes::CONFLICT),
            ApiError::Database(e) => {
                tracing::error!(error = %e, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, codes::DATABASE_ERROR)
            }
            ApiError::Internal(message) => {
                tracing::error!(message, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, codes::INTERNAL_ERROR)
            }
            ApiError::NotImplemented => (StatusCode::NOT_IMPLEMENTED, codes::NOT_IMPLEMENTED),
        };

        (status, Json(ErrorBody::new(code, self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_do_not_leak_details() {
        let err = ApiError::Database(sqlx::Error::Protocol("secret detail".into()));
        assert_eq!(err.to_string(), "database error");
    }

    #[test]
    fn not_found_names_the_resource() {
        assert_eq!(ApiError::NotFound("coffee").to_string(), "coffee not found");
    }
}
