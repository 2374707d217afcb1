//! Payment provider client for checkout sessions.
//!
//! A checkout session is an external provider resource representing a
//! pending payment attempt; we send the order's line items and callback
//! URLs and get back a session identifier used to redirect the buyer.
//! The provider is reached through the narrow [`CheckoutProvider`] trait
//! so handlers can be tested against a mock.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

/// Stripe API base URL.
const BASE_URL: &str = "https://api.stripe.com/v1";

/// Errors that can occur when creating a checkout session.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error response.
    #[error("checkout API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the provider response.
    #[error("checkout parse error: {0}")]
    Parse(String),
}

/// One checkout line item, priced in minor units (cents).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub name: String,
    pub unit_amount: i64,
    pub quantity: i64,
    pub image: Option<String>,
}

/// Everything the provider needs to open a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub line_items: Vec<LineItem>,
    pub success_url: String,
    pub cancel_url: String,
}

/// Narrow interface to the payment provider.
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    /// Create a checkout session and return its identifier.
    async fn create_session(&self, request: &CheckoutRequest) -> Result<String, CheckoutError>;
}

/// Stripe Checkout Sessions client.
#[derive(Clone)]
pub struct StripeCheckout {
    client: reqwest::Client,
    base_url: String,
}

impl StripeCheckout {
    /// Create a new client authenticated with the account's secret key.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(secret_key: &SecretString) -> Result<Self, CheckoutError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", secret_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| CheckoutError::Parse(format!("invalid secret key format: {e}")))?,
        );

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_owned(),
        })
    }

    /// Point the client at a different API host (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Checkout session resource, reduced to what we read back.
#[derive(Debug, Deserialize)]
struct Session {
    id: String,
}

#[async_trait]
impl CheckoutProvider for StripeCheckout {
    async fn create_session(&self, request: &CheckoutRequest) -> Result<String, CheckoutError> {
        let url = format!("{}/checkout/sessions", self.base_url);
        let params = session_params(request);

        let response = self.client.post(&url).form(&params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CheckoutError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: Session = response
            .json()
            .await
            .map_err(|e| CheckoutError::Parse(e.to_string()))?;

        Ok(session.id)
    }
}

/// Flatten a request into Stripe's bracketed form encoding.
fn session_params(request: &CheckoutRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("mode".to_owned(), "payment".to_owned()),
        ("success_url".to_owned(), request.success_url.clone()),
        ("cancel_url".to_owned(), request.cancel_url.clone()),
    ];

    for (i, item) in request.line_items.iter().enumerate() {
        params.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        params.push((
            format!("line_items[{i}][price_data][currency]"),
            "usd".to_owned(),
        ));
        params.push((
            format!("line_items[{i}][price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        params.push((
            format!("line_items[{i}][price_data][product_data][name]"),
            item.name.clone(),
        ));
        if let Some(image) = &item.image {
            params.push((
                format!("line_items[{i}][price_data][product_data][images][0]"),
                image.clone(),
            ));
        }
    }

    params
}
