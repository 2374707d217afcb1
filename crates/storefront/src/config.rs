//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `AUTH_TOKEN_SECRET` - auth token signing secret (min 32 chars)
//! - `STRIPE_SECRET_KEY` - payment provider secret key
//!
//! ## Optional
//! - `HOST` - bind address (default: 127.0.0.1)
//! - `PORT` - listen port (default: 4000)
//! - `BASE_URL` - public URL of this server, used to build uploaded image
//!   URLs (default: `http://localhost:<PORT>`)
//! - `CLIENT_BASE_URL` - frontend URL the payment provider redirects back
//!   to (default: `http://localhost:3000`)
//! - `UPLOAD_DIR` - directory for uploaded images (default: `upload/images`)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SECRET_LENGTH: usize = 32;

/// Common placeholder fragments that must never appear in real secrets.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "changeme",
    "replace",
    "placeholder",
    "example",
    "your-",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
///
/// Everything a handler needs arrives through this struct - there is no
/// ambient secret or global store handle anywhere in the crate.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of this server
    pub base_url: String,
    /// Frontend base URL for payment success/cancel redirects
    pub client_base_url: String,
    /// Auth token signing secret
    pub auth_token_secret: SecretString,
    /// Payment provider secret key
    pub stripe_secret_key: SecretString,
    /// Directory where uploaded images are written and served from
    pub upload_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if a secret looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url =
            SecretString::from(get_required_env("DATABASE_URL")?);
        let host = get_env_or_default("HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("PORT", "4000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_owned(), e.to_string()))?;
        let base_url =
            get_env_or_default("BASE_URL", &format!("http://localhost:{port}"));
        let client_base_url =
            get_env_or_default("CLIENT_BASE_URL", "http://localhost:3000");
        let auth_token_secret = get_validated_secret("AUTH_TOKEN_SECRET")?;
        validate_secret_length(&auth_token_secret, "AUTH_TOKEN_SECRET")?;
        let stripe_secret_key = get_validated_secret("STRIPE_SECRET_KEY")?;
        let upload_dir = PathBuf::from(get_env_or_default("UPLOAD_DIR", "upload/images"));
        let sentry_dsn = std::env::var("SENTRY_DSN").ok();

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            client_base_url,
            auth_token_secret,
            stripe_secret_key,
            upload_dir,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Load a secret, rejecting obvious placeholders.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                key.to_owned(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(SecretString::from(value))
}

/// Validate that a signing secret meets the minimum length requirement.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let len = secret.expose_secret().len();
    if len < MIN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!("must be at least {MIN_SECRET_LENGTH} characters (got {len})"),
        ));
    }
    Ok(())
}
