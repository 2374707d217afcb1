//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. The status-code taxonomy
//! is part of this system's external contract: validation failures are
//! 400, missing/invalid tokens are 401, a missing order on status update
//! is 404, and store failures are 500 - all with JSON bodies carrying a
//! `success: false` field so callers can inspect a single shape.
//! Checkout-flow failures are the deliberate exception: the place-order
//! handler reports them as HTTP 200 with `success: false` (see
//! `routes::orders`), never through this type.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use threadline_core::CartError;

use crate::db::RepositoryError;
use crate::services::token::TokenError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Request failed validation.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Invalid cart slot.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Missing or invalid auth token.
    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] TokenError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        match self {
            Self::Database(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response(),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "Internal server error" })),
            )
                .into_response(),
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "message": message })),
            )
                .into_response(),
            Self::Cart(e) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "message": e.to_string() })),
            )
                .into_response(),
            Self::Unauthorized(_) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Please authenticate using a valid token" })),
            )
                .into_response(),
            Self::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "success": false, "message": message })),
            )
                .into_response(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// JSON body extractor whose rejection follows this crate's taxonomy.
///
/// `axum::Json` rejects malformed bodies with 422; the contract here is
/// 400 with a `success: false` body for every validation failure.
pub struct AppJson<T>(pub T);

impl<S, T> axum::extract::FromRequest<S> for AppJson<T>
where
    Json<T>: axum::extract::FromRequest<S, Rejection = axum::extract::rejection::JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(
        req: axum::extract::Request,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Order not found".to_owned());
        assert_eq!(err.to_string(), "Not found: Order not found");

        let err = AppError::BadRequest("invalid input".to_owned());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            status_of(AppError::BadRequest("x".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Cart(CartError::SlotOutOfRange(400))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::NotFound("x".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Internal("x".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::Unauthorized(TokenError::Missing)),
            StatusCode::UNAUTHORIZED
        );
    }
}
