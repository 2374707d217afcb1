//! HTTP middleware for the storefront.

pub mod auth;

pub use auth::{AUTH_TOKEN_HEADER, RequireAuth};
