//! Password hashing.
//!
//! Credentials are stored as argon2id hashes and verified against the
//! stored hash; the plaintext never touches the store.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Error hashing a password.
#[derive(Debug, thiserror::Error)]
#[error("password hashing failed")]
pub struct PasswordHashError;

/// Hash a password using Argon2id with a random salt.
///
/// # Errors
///
/// Returns `PasswordHashError` if hashing fails.
pub fn hash(password: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| PasswordHashError)
}

/// Verify a password against a stored hash.
///
/// An unparseable hash verifies as false rather than erroring; login
/// reports it the same way as a wrong password.
#[must_use]
pub fn verify(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
