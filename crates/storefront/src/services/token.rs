//! Signed auth tokens.
//!
//! Tokens are HS256-signed credentials embedding the user id, passed by
//! clients in the `auth-token` header. The signing secret comes from
//! configuration; nothing in this module reads the environment. Tokens
//! expire after 24 hours.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use threadline_core::UserId;

/// Token lifetime.
const EXPIRY_HOURS: i64 = 24;

/// Errors from token issuance and verification.
#[derive(Debug, Error)]
pub enum TokenError {
    /// No token header was supplied.
    #[error("missing auth token")]
    Missing,

    /// Signature invalid, token malformed, or claims unusable.
    #[error("invalid auth token: {0}")]
    Invalid(String),

    /// Token expired.
    #[error("auth token expired")]
    Expired,
}

/// Claims carried in a signed token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id, as a decimal string.
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies auth tokens with a fixed shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    /// Create a token service from the configured signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
        }
    }

    /// Issue a token embedding `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if signing fails.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(EXPIRY_HOURS)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }

    /// Verify a token and extract the embedded user id.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for expired tokens and
    /// `TokenError::Invalid` for anything else that fails verification.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        let data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid(e.to_string()),
                }
            })?;

        let id: i64 = data
            .claims
            .sub
            .parse()
            .map_err(|_| TokenError::Invalid("non-numeric subject".to_owned()))?;

        Ok(UserId::new(id))
    }
}
