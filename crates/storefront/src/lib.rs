//! Threadline storefront library.
//!
//! This crate provides the storefront backend as a library so the
//! HTTP surface can be exercised in integration tests without a
//! running server or database.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
