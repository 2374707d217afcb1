//! Order model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use threadline_core::{OrderId, UserId};

/// Default status for a freshly placed order.
pub const DEFAULT_STATUS: &str = "Pending";

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub price: Decimal,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A placed order.
///
/// Created before payment confirmation: existence of an order does not
/// imply payment, only the `payment` flag does. The failed-payment
/// callback deletes the order outright. `user_id` is not referentially
/// checked against the user collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub amount: Decimal,
    /// Free-form structured shipping address, stored verbatim.
    pub address: serde_json::Value,
    pub status: String,
    pub date: DateTime<Utc>,
    pub payment: bool,
}

impl Order {
    /// Build a new pending, unpaid order with a freshly generated id.
    #[must_use]
    pub fn pending(
        user_id: UserId,
        items: Vec<OrderItem>,
        amount: Decimal,
        address: serde_json::Value,
    ) -> Self {
        Self {
            id: OrderId::generate(),
            user_id,
            items,
            amount,
            address,
            status: DEFAULT_STATUS.to_owned(),
            date: Utc::now(),
            payment: false,
        }
    }
}
