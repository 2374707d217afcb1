//! Order and checkout route handlers.
//!
//! Placing an order creates the order document *before* payment
//! confirmation; only the later `/verify-order` callback flips the
//! payment flag (success) or deletes the order (failure). The callback's
//! success flag is trusted as supplied by the client redirect; there is
//! no server-side reconciliation against the provider.

use axum::Json;
use axum::extract::{Path, State};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::instrument;

use threadline_core::{Cart, OrderId, UserId, minor_units};

use crate::db::RepositoryError;
use crate::error::{AppError, AppJson, Result};
use crate::middleware::RequireAuth;
use crate::models::{Order, OrderItem};
use crate::services::checkout::{CheckoutError, CheckoutRequest, LineItem};
use crate::state::AppState;

/// Incoming order line, priced in standard units.
///
/// `price` is optional here so a missing or null price surfaces as the
/// checkout-flow "Invalid price" error rather than a body rejection.
#[derive(Debug, Deserialize)]
pub struct IncomingItem {
    pub name: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub image: Option<String>,
}

const fn default_quantity() -> i64 {
    1
}

/// Body for `/place-order`.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<IncomingItem>,
    pub amount: Decimal,
    pub address: Value,
    /// Client-supplied replacement for the stored cart. Trusted verbatim.
    #[serde(default, rename = "cartData")]
    pub cart_data: Option<Cart>,
}

/// Body for `/verify-order`: the client callback's query values.
#[derive(Debug, Deserialize)]
pub struct VerifyOrderRequest {
    /// `"true"` on the success redirect; anything else is failure.
    pub success: String,
    #[serde(rename = "orderId")]
    pub order_id: String,
}

/// Body for `PUT /orders/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Failures inside the checkout flow.
///
/// These never surface as non-200 statuses: the handler reports them as
/// `{"success": false, "error": ...}` with HTTP 200.
#[derive(Debug, Error)]
enum PlaceOrderError {
    #[error("Invalid price for item: {0}")]
    InvalidPrice(String),

    #[error("{0}")]
    Checkout(#[from] CheckoutError),

    #[error("{0}")]
    Store(#[from] RepositoryError),
}

/// Create an order and a checkout session for it.
///
/// An empty items list is the one validation rejected up front with 400;
/// everything downstream of it follows the checkout-flow error contract.
#[instrument(skip(state, request), fields(user_id = %user_id))]
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    AppJson(request): AppJson<PlaceOrderRequest>,
) -> Result<Json<Value>> {
    if request.items.is_empty() {
        return Err(AppError::BadRequest("No items in the order.".to_owned()));
    }

    match try_place_order(&state, user_id, request).await {
        Ok(session_id) => Ok(Json(json!({ "id": session_id, "success": true }))),
        Err(e) => {
            tracing::warn!(error = %e, "checkout session creation failed");
            Ok(Json(json!({ "success": false, "error": e.to_string() })))
        }
    }
}

async fn try_place_order(
    state: &AppState,
    user_id: UserId,
    request: PlaceOrderRequest,
) -> std::result::Result<String, PlaceOrderError> {
    let mut line_items = Vec::with_capacity(request.items.len());
    let mut order_items = Vec::with_capacity(request.items.len());

    for item in request.items {
        let price = item
            .price
            .filter(|p| *p > Decimal::ZERO)
            .ok_or_else(|| PlaceOrderError::InvalidPrice(item.name.clone()))?;
        let unit_amount =
            minor_units(price).ok_or_else(|| PlaceOrderError::InvalidPrice(item.name.clone()))?;

        line_items.push(LineItem {
            name: item.name.clone(),
            unit_amount,
            quantity: item.quantity,
            image: item.image.clone(),
        });
        order_items.push(OrderItem {
            name: item.name,
            price,
            quantity: item.quantity,
            image: item.image,
        });
    }

    // The order id must exist before the session does: the provider's
    // callback URLs embed it.
    let order = Order::pending(user_id, order_items, request.amount, request.address);

    let client_base = &state.config().client_base_url;
    let session_id = state
        .checkout()
        .create_session(&CheckoutRequest {
            line_items,
            success_url: format!("{client_base}/verify?success=true&orderId={}", order.id),
            cancel_url: format!("{client_base}/verify?success=false&orderId={}", order.id),
        })
        .await?;

    // Overwrite the stored cart with whatever the client sent; server
    // state is not recomputed here.
    if let Some(cart) = &request.cart_data {
        state.users().set_cart(user_id, cart).await?;
    }

    state.orders().insert(&order).await?;
    tracing::info!(order_id = %order.id, session_id = %session_id, "order placed");

    Ok(session_id)
}

/// Payment callback: mark the order paid, or delete it on failure.
#[instrument(skip(state))]
pub async fn verify_order(
    State(state): State<AppState>,
    AppJson(request): AppJson<VerifyOrderRequest>,
) -> Result<Json<Value>> {
    let order_id = OrderId::parse(&request.order_id)
        .map_err(|_| AppError::BadRequest("Invalid order id".to_owned()))?;

    if request.success == "true" {
        state.orders().mark_paid(order_id).await?;
        tracing::info!(order_id = %order_id, "payment successful");
        Ok(Json(json!({ "success": true, "message": "Payment Successful" })))
    } else {
        state.orders().delete(order_id).await?;
        tracing::info!(order_id = %order_id, "payment failed, order deleted");
        Ok(Json(json!({ "success": false, "message": "Payment Failed" })))
    }
}

/// The caller's own orders.
#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn get_orders(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Json<Value>> {
    let orders = state.orders().for_user(user_id).await?;
    Ok(Json(json!({ "success": true, "orders": orders })))
}

/// Every order, for the admin surface. Unauthenticated.
pub async fn all_orders(State(state): State<AppState>) -> Result<Json<Value>> {
    let orders = state.orders().all().await?;
    Ok(Json(json!({ "success": true, "data": orders })))
}

/// Set an order's status.
#[instrument(skip(state, request))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(request): AppJson<UpdateStatusRequest>,
) -> Result<Json<Value>> {
    let order_id =
        OrderId::parse(&id).map_err(|_| AppError::NotFound("Order not found".to_owned()))?;

    let order = state
        .orders()
        .set_status(order_id, &request.status)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Order status updated successfully",
        "order": order,
    })))
}
