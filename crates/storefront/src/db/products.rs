//! `PostgreSQL` product store.
//!
//! Queries are runtime-checked `query_as` calls against row structs; the
//! crate compiles without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use threadline_core::ProductId;

use super::{ProductStore, RepositoryError};
use crate::models::Product;

/// Product repository backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    image: String,
    category: String,
    new_price: Decimal,
    old_price: Decimal,
    date: DateTime<Utc>,
    available: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            image: row.image,
            category: row.category,
            new_price: row.new_price,
            old_price: row.old_price,
            date: row.date,
            available: row.available,
        }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, image, category, new_price, old_price, date, available
            FROM products
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn max_id(&self) -> Result<Option<ProductId>, RepositoryError> {
        let max: Option<i64> = sqlx::query_scalar("SELECT MAX(id) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(max.map(ProductId::new))
    }

    async fn insert(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO products (id, name, image, category, new_price, old_price, date, available)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.image)
        .bind(&product.category)
        .bind(product.new_price)
        .bind(product.old_price)
        .bind(product.date)
        .bind(product.available)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn by_category(
        &self,
        category: &str,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, image, category, new_price, old_price, date, available
            FROM products
            WHERE category = $1
            ORDER BY id ASC
            LIMIT $2
            ",
        )
        .bind(category)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}
