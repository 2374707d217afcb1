//! Threadline Core - Shared types library.
//!
//! This crate provides common types used across Threadline components.
//! It contains only types - no I/O, no database access, no HTTP clients -
//! which keeps it lightweight and usable anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, carts, and money

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
