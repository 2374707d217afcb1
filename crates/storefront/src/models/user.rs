//! User account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use threadline_core::{Cart, Email, UserId};

/// A registered user.
///
/// Passwords are stored as argon2 hashes, never in plaintext. The cart is
/// part of the user document and is rewritten whole on every cart
/// mutation. Users cannot be deleted.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub cart: Cart,
    pub date: DateTime<Utc>,
}
