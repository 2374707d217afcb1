//! Cart route handlers. All three require a valid auth token.
//!
//! Each operation re-fetches and re-persists the caller's whole cart;
//! there is no atomic increment, so concurrent mutations of the same
//! cart can lose updates. That is this system's documented model.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use threadline_core::{Cart, UserId};

use crate::error::{AppError, AppJson, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Body naming the cart slot to mutate.
#[derive(Debug, Deserialize)]
pub struct CartSlotRequest {
    #[serde(rename = "itemId")]
    pub item_id: usize,
}

async fn fetch_cart(state: &AppState, user_id: UserId) -> Result<Cart> {
    state
        .users()
        .cart(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))
}

/// Add one unit to the named slot. No upper bound, and no check that the
/// slot corresponds to an existing product.
#[instrument(skip(state), fields(user_id = %user_id, item_id = request.item_id))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    AppJson(request): AppJson<CartSlotRequest>,
) -> Result<Json<Value>> {
    let mut cart = fetch_cart(&state, user_id).await?;
    cart.add(request.item_id)?;
    state.users().set_cart(user_id, &cart).await?;
    Ok(Json(json!({ "success": true })))
}

/// Remove one unit from the named slot, flooring at zero.
#[instrument(skip(state), fields(user_id = %user_id, item_id = request.item_id))]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    AppJson(request): AppJson<CartSlotRequest>,
) -> Result<Json<Value>> {
    let mut cart = fetch_cart(&state, user_id).await?;
    cart.remove(request.item_id)?;
    state.users().set_cart(user_id, &cart).await?;
    Ok(Json(json!({ "success": true })))
}

/// Return the caller's entire cart map verbatim.
#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn get_cart_data(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Json<Cart>> {
    Ok(Json(fetch_cart(&state, user_id).await?))
}
