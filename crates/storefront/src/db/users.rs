//! `PostgreSQL` user store.
//!
//! The cart lives inside the user row as JSONB and is read and rewritten
//! whole by the cart operations - two independent round-trips per
//! mutation, with no atomic increment. That mirrors the system's
//! documented concurrency model rather than improving on it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use threadline_core::{Cart, Email, UserId};

use super::{RepositoryError, UserStore};
use crate::models::User;

/// User repository backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    cart: Json<Cart>,
    date: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(User {
            id: UserId::new(self.id),
            username: self.username,
            email,
            password_hash: self.password_hash,
            cart: self.cart.0,
            date: self.date,
        })
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, email, password_hash, cart, date
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, email, password_hash, cart, date
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn create(
        &self,
        username: &str,
        email: &Email,
        password_hash: &str,
        cart: &Cart,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (username, email, password_hash, cart)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, cart, date
            ",
        )
        .bind(username)
        .bind(email.as_str())
        .bind(password_hash)
        .bind(Json(cart))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_user()
    }

    async fn cart(&self, id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let cart: Option<Json<Cart>> =
            sqlx::query_scalar("SELECT cart FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(cart.map(|c| c.0))
    }

    async fn set_cart(&self, id: UserId, cart: &Cart) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET cart = $1 WHERE id = $2")
            .bind(Json(cart))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
