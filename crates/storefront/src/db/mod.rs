//! Persistence layer for the storefront.
//!
//! Three document collections back the system:
//!
//! - `products` - catalog entries with app-assigned numeric ids
//! - `users` - accounts with an embedded JSONB cart
//! - `orders` - placed orders with JSONB line items and address
//!
//! Storage is abstracted behind one repository trait per entity so the
//! technology is swappable and handlers are testable against the
//! in-memory fakes in [`memory`]. The production implementations in
//! [`products`], [`users`], and [`orders`] run on `PostgreSQL` via sqlx.
//!
//! Migrations are embedded from `crates/storefront/migrations/` and run
//! at startup.

pub mod memory;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use threadline_core::{Cart, Email, OrderId, ProductId, UserId};

use crate::models::{Order, Product, User};

pub use memory::{MemoryOrderStore, MemoryProductStore, MemoryUserStore};
pub use orders::PgOrderStore;
pub use products::PgProductStore;
pub use users::PgUserStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Catalog storage.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Every product, in store-default (insertion) order.
    async fn all(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Highest assigned product id, or `None` for an empty catalog.
    ///
    /// Callers compute the next id from this and then insert in a second
    /// round-trip; the two are deliberately not isolated from each other.
    async fn max_id(&self) -> Result<Option<ProductId>, RepositoryError>;

    /// Insert a product with a caller-assigned id.
    async fn insert(&self, product: &Product) -> Result<(), RepositoryError>;

    /// Delete by id. Returns whether anything matched.
    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError>;

    /// First `limit` products of a category, in store-default order.
    async fn by_category(
        &self,
        category: &str,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError>;
}

/// User account storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by email.
    async fn by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Look up a user by id.
    async fn by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Create a user with a store-assigned id.
    ///
    /// Returns `RepositoryError::Conflict` when the email already exists.
    async fn create(
        &self,
        username: &str,
        email: &Email,
        password_hash: &str,
        cart: &Cart,
    ) -> Result<User, RepositoryError>;

    /// Fetch a user's cart.
    async fn cart(&self, id: UserId) -> Result<Option<Cart>, RepositoryError>;

    /// Replace a user's cart wholesale.
    ///
    /// Returns `RepositoryError::NotFound` when the user does not exist.
    async fn set_cart(&self, id: UserId, cart: &Cart) -> Result<(), RepositoryError>;
}

/// Order storage.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist an order with its app-assigned id.
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError>;

    /// Flip the payment flag to true. Returns whether anything matched.
    async fn mark_paid(&self, id: OrderId) -> Result<bool, RepositoryError>;

    /// Delete by id. Returns whether anything matched.
    async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError>;

    /// All orders belonging to `user_id`, in store-default order.
    async fn for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// Every order, unfiltered.
    async fn all(&self) -> Result<Vec<Order>, RepositoryError>;

    /// Set an order's status, returning the updated order, or `None` when
    /// the id does not exist.
    async fn set_status(
        &self,
        id: OrderId,
        status: &str,
    ) -> Result<Option<Order>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run the embedded migrations.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
