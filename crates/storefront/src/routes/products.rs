//! Catalog route handlers.

use axum::Json;
use axum::extract::State;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use threadline_core::ProductId;

use crate::error::{AppJson, Result};
use crate::models::Product;
use crate::state::AppState;

/// Fields supplied by the caller when creating a product.
#[derive(Debug, Deserialize)]
pub struct AddProductRequest {
    pub name: String,
    pub image: String,
    pub category: String,
    pub new_price: Decimal,
    pub old_price: Decimal,
}

/// Body for `/deleteproduct`. The echoed `name` is optional.
#[derive(Debug, Deserialize)]
pub struct DeleteProductRequest {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// `{success, name}` acknowledgement for catalog mutations.
#[derive(Debug, Serialize)]
pub struct CatalogAck {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Create a product.
///
/// The id is computed as max existing id + 1 (1 for an empty catalog)
/// in a separate round-trip from the insert; concurrent creates can
/// collide, which is accepted behavior for this system.
#[instrument(skip(state), fields(name = %request.name))]
pub async fn add_product(
    State(state): State<AppState>,
    AppJson(request): AppJson<AddProductRequest>,
) -> Result<Json<CatalogAck>> {
    let next_id = state
        .products()
        .max_id()
        .await?
        .map_or(1, |id| id.as_i64() + 1);

    let product = Product {
        id: ProductId::new(next_id),
        name: request.name.clone(),
        image: request.image,
        category: request.category,
        new_price: request.new_price,
        old_price: request.old_price,
        date: chrono::Utc::now(),
        available: true,
    };

    state.products().insert(&product).await?;
    tracing::info!(id = next_id, "product created");

    Ok(Json(CatalogAck {
        success: true,
        name: Some(request.name),
    }))
}

/// Delete a product by id. Succeeds even when nothing matched.
#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    AppJson(request): AppJson<DeleteProductRequest>,
) -> Result<Json<CatalogAck>> {
    let matched = state.products().delete(ProductId::new(request.id)).await?;
    tracing::info!(id = request.id, matched, "product delete");

    Ok(Json(CatalogAck {
        success: true,
        name: request.name,
    }))
}

/// Every product, unfiltered and unpaginated.
pub async fn all_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.products().all().await?))
}

/// "New collection" slice: skip the first product of the unsorted list,
/// then take the last 8 of the remainder. This is literal positional
/// slicing over store-default order; nothing guarantees "newest".
pub async fn new_collection(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.products().all().await?;
    let rest: Vec<Product> = products.into_iter().skip(1).collect();
    let start = rest.len().saturating_sub(8);
    Ok(Json(rest.into_iter().skip(start).collect()))
}

/// First 4 products in category "men", in store-default order.
pub async fn popular_men(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.products().by_category("men", 4).await?))
}
