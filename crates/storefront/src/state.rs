//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::{OrderStore, ProductStore, UserStore};
use crate::services::checkout::CheckoutProvider;
use crate::services::token::TokenService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Stores and the checkout provider are held
/// as trait objects, so the binary wires in `PostgreSQL` and Stripe while
/// tests wire in fakes - no ambient singletons anywhere.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    products: Arc<dyn ProductStore>,
    users: Arc<dyn UserStore>,
    orders: Arc<dyn OrderStore>,
    checkout: Arc<dyn CheckoutProvider>,
    tokens: TokenService,
}

impl AppState {
    /// Assemble application state from configuration and collaborators.
    #[must_use]
    pub fn new(
        config: AppConfig,
        products: Arc<dyn ProductStore>,
        users: Arc<dyn UserStore>,
        orders: Arc<dyn OrderStore>,
        checkout: Arc<dyn CheckoutProvider>,
    ) -> Self {
        let tokens = TokenService::new(&config.auth_token_secret);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                products,
                users,
                orders,
                checkout,
                tokens,
            }),
        }
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the product store.
    #[must_use]
    pub fn products(&self) -> &dyn ProductStore {
        self.inner.products.as_ref()
    }

    /// Get the user store.
    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.inner.users.as_ref()
    }

    /// Get the order store.
    #[must_use]
    pub fn orders(&self) -> &dyn OrderStore {
        self.inner.orders.as_ref()
    }

    /// Get the checkout provider.
    #[must_use]
    pub fn checkout(&self) -> &dyn CheckoutProvider {
        self.inner.checkout.as_ref()
    }

    /// Get the token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }
}
