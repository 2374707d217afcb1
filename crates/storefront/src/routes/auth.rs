//! Account route handlers: registration and login.
//!
//! Login failures ("Wrong Email" / "Wrong Password") are reported as
//! HTTP 200 with a `success: false` body - callers of this API inspect
//! the success field, not the status code. Registration rejects
//! duplicate emails with 400.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use threadline_core::{Cart, Email};

use crate::error::{AppError, AppJson, Result};
use crate::services::password;
use crate::state::AppState;

/// Body for `/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body for `/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Register a new user.
///
/// Initializes the 300-slot zeroed cart, stores the argon2 hash of the
/// password, and returns a signed token embedding the new user's id.
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<Json<Value>> {
    let email = Email::parse(&request.email)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if state.users().by_email(&email).await?.is_some() {
        return Err(AppError::BadRequest("Email already exists".to_owned()));
    }

    let password_hash = password::hash(&request.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = state
        .users()
        .create(&request.username, &email, &password_hash, &Cart::new())
        .await?;

    let token = state
        .tokens()
        .issue(user.id)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(Json(json!({
        "success": true,
        "message": "User registered successfully",
        "token": token,
    })))
}

/// Log a user in.
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<Value>> {
    let Ok(email) = Email::parse(&request.email) else {
        return Ok(Json(json!({ "success": false, "message": "Wrong Email" })));
    };

    let Some(user) = state.users().by_email(&email).await? else {
        return Ok(Json(json!({ "success": false, "message": "Wrong Email" })));
    };

    if !password::verify(&request.password, &user.password_hash) {
        return Ok(Json(json!({ "success": false, "message": "Wrong Password" })));
    }

    let token = state
        .tokens()
        .issue(user.id)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(json!({
        "success": true,
        "message": "User logged in successfully",
        "token": token,
    })))
}
