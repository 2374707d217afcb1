//! Core types for Threadline.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod money;

pub use cart::{CART_SLOTS, Cart, CartError};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::minor_units;
