use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use skylark_core::error::{BookingError, SearchError};

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    ConflictError(String),
    ServiceUnavailable(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::ServiceUnavailable(msg) => {
                tracing::error!("Service Unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        let msg = err.to_string();
        match err {
            // Both are contention outcomes the client can retry or
            // re-plan around.
            BookingError::LockBusy | BookingError::SoldOut(_) => AppError::ConflictError(msg),
            BookingError::ResourceNotFound => AppError::ValidationError(msg),
            BookingError::ReferenceCollision { .. } => AppError::ServiceUnavailable(msg),
            BookingError::StoreUnavailable(_) => AppError::InternalServerError(msg),
        }
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        let msg = err.to_string();
        match err {
            SearchError::InvalidQuery(_) | SearchError::InvalidDate(_) => {
                AppError::ValidationError(msg)
            }
            SearchError::StoreUnavailable(_) => AppError::InternalServerError(msg),
        }
    }
}
