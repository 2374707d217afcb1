//! Authentication extractor.
//!
//! Protected routes take [`RequireAuth`], which reads the signed token
//! from the `auth-token` header and resolves it to a [`UserId`]. A
//! missing or invalid token rejects the request with a single 401
//! response before the handler runs - there is no fall-through path that
//! could answer twice.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use threadline_core::UserId;

use crate::error::AppError;
use crate::services::token::TokenError;
use crate::state::AppState;

/// Header carrying the signed auth token.
pub const AUTH_TOKEN_HEADER: &str = "auth-token";

/// Extractor that requires a valid auth token.
///
/// The embedded user id is the only identity the handler sees; every
/// authenticated operation is keyed by it. There is no role or
/// permission distinction.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user_id): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("user {user_id}")
/// }
/// ```
pub struct RequireAuth(pub UserId);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized(TokenError::Missing))?;

        let user_id = state.tokens().verify(token)?;

        Ok(Self(user_id))
    }
}
