//! In-memory store fakes.
//!
//! Drop-in implementations of the repository traits over `RwLock`-guarded
//! maps, preserving insertion order. They exist so handlers can be
//! exercised without a database; the router-level tests are built on
//! them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use threadline_core::{Cart, Email, OrderId, ProductId, UserId};

use super::{OrderStore, ProductStore, RepositoryError, UserStore};
use crate::models::{Order, Product, User};

/// In-memory product store.
#[derive(Default)]
pub struct MemoryProductStore {
    products: RwLock<Vec<Product>>,
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn all(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.products.read().await.clone())
    }

    async fn max_id(&self) -> Result<Option<ProductId>, RepositoryError> {
        Ok(self.products.read().await.iter().map(|p| p.id).max())
    }

    async fn insert(&self, product: &Product) -> Result<(), RepositoryError> {
        self.products.write().await.push(product.clone());
        Ok(())
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() < before)
    }

    async fn by_category(
        &self,
        category: &str,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .products
            .read()
            .await
            .iter()
            .filter(|p| p.category == category)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// In-memory user store with serial id assignment.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
    next_id: AtomicI64,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == *email)
            .cloned())
    }

    async fn by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn create(
        &self,
        username: &str,
        email: &Email,
        password_hash: &str,
        cart: &Cart,
    ) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == *email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let user = User {
            id: UserId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            username: username.to_owned(),
            email: email.clone(),
            password_hash: password_hash.to_owned(),
            cart: cart.clone(),
            date: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn cart(&self, id: UserId) -> Result<Option<Cart>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.cart.clone()))
    }

    async fn set_cart(&self, id: UserId, cart: &Cart) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepositoryError::NotFound)?;
        user.cart = cart.clone();
        Ok(())
    }
}

/// In-memory order store.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
    insertion: RwLock<Vec<OrderId>>,
}

impl MemoryOrderStore {
    async fn ordered(&self) -> Vec<Order> {
        let orders = self.orders.read().await;
        self.insertion
            .read()
            .await
            .iter()
            .filter_map(|id| orders.get(id).cloned())
            .collect()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        self.orders.write().await.insert(order.id, order.clone());
        self.insertion.write().await.push(order.id);
        Ok(())
    }

    async fn mark_paid(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&id) {
            Some(order) => {
                order.payment = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let removed = self.orders.write().await.remove(&id).is_some();
        if removed {
            self.insertion.write().await.retain(|i| *i != id);
        }
        Ok(removed)
    }

    async fn for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        Ok(self
            .ordered()
            .await
            .into_iter()
            .filter(|o| o.user_id == user_id)
            .collect())
    }

    async fn all(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(self.ordered().await)
    }

    async fn set_status(
        &self,
        id: OrderId,
        status: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&id) {
            Some(order) => {
                order.status = status.to_owned();
                Ok(Some(order.clone()))
            }
            None => Ok(None),
        }
    }
}
