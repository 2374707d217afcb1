//! Catalog product model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use threadline_core::ProductId;

/// A catalog entry.
///
/// Products are created and deleted whole; there is no in-place update.
/// The numeric id is assigned by the create handler as max existing id + 1
/// (or 1 for an empty catalog) across two separate store round-trips, so
/// concurrent creates can collide - a documented weakness of this system,
/// not something the storage layer papers over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Public URL of the product image.
    pub image: String,
    pub category: String,
    pub new_price: Decimal,
    pub old_price: Decimal,
    pub date: DateTime<Utc>,
    pub available: bool,
}
