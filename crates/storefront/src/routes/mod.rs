//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /              - liveness string
//! GET  /health        - liveness probe
//! GET  /health/ready  - readiness probe (pings the product store)
//!
//! # Uploads
//! POST /upload        - multipart image upload
//! GET  /images/{file} - serve uploaded images
//!
//! # Catalog
//! POST /addproduct    - create product (app-assigned numeric id)
//! POST /deleteproduct - delete product by id
//! GET  /allproducts   - full catalog
//! GET  /newcollection - positional slice: skip first, last 8 of the rest
//! GET  /popularmen    - first 4 products in category "men"
//!
//! # Accounts
//! POST /register      - create user, returns token
//! POST /login         - returns token or failure message
//!
//! # Cart (auth-token required)
//! POST /addtocart     - increment a cart slot
//! POST /removefromcart - decrement a cart slot (floor at zero)
//! POST /getcartdata   - full cart map
//!
//! # Orders
//! POST /place-order   - create order + checkout session (auth-token)
//! POST /verify-order  - payment callback: mark paid or delete
//! POST /getorders     - caller's orders (auth-token)
//! GET  /allorders     - all orders (admin, unauthenticated)
//! PUT  /orders/{id}   - set order status
//! ```

pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;
pub mod upload;

use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Router, extract::State};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    let images_dir = state.config().upload_dir.clone();

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/upload", post(upload::upload))
        .route("/addproduct", post(products::add_product))
        .route("/deleteproduct", post(products::delete_product))
        .route("/allproducts", get(products::all_products))
        .route("/newcollection", get(products::new_collection))
        .route("/popularmen", get(products::popular_men))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/addtocart", post(cart::add_to_cart))
        .route("/removefromcart", post(cart::remove_from_cart))
        .route("/getcartdata", post(cart::get_cart_data))
        .route("/place-order", post(orders::place_order))
        .route("/verify-order", post(orders::verify_order))
        .route("/getorders", post(orders::get_orders))
        .route("/allorders", get(orders::all_orders))
        .route("/orders/{id}", put(orders::update_status))
        .nest_service("/images", ServeDir::new(images_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness string served at the root.
async fn root() -> &'static str {
    "Storefront API is up and running"
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Probes the product store before returning OK; 503 when unreachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.products().max_id().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
