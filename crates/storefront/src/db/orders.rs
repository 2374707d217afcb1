//! `PostgreSQL` order store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use threadline_core::{OrderId, UserId};

use super::{OrderStore, RepositoryError};
use crate::models::{Order, OrderItem};

/// Order repository backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: uuid::Uuid,
    user_id: i64,
    items: Json<Vec<OrderItem>>,
    amount: Decimal,
    address: Json<serde_json::Value>,
    status: String,
    date: DateTime<Utc>,
    payment: bool,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::from_uuid(row.id),
            user_id: UserId::new(row.user_id),
            items: row.items.0,
            amount: row.amount,
            address: row.address.0,
            status: row.status,
            date: row.date,
            payment: row.payment,
        }
    }
}

const SELECT_COLUMNS: &str =
    "id, user_id, items, amount, address, status, date, payment";

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO orders (id, user_id, items, amount, address, status, date, payment)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(Json(&order.items))
        .bind(order.amount)
        .bind(Json(&order.address))
        .bind(&order.status)
        .bind(order.date)
        .bind(order.payment)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_paid(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE orders SET payment = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY date ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM orders ORDER BY date ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn set_status(
        &self,
        id: OrderId,
        status: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $1 WHERE id = $2 RETURNING {SELECT_COLUMNS}"
        ))
        .bind(status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Order::from))
    }
}
