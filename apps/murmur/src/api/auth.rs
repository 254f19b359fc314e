//! Account endpoints: register, login, me.

use super::error::ApiError;
use super::extract::AuthUser;
use super::{unix_now, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use murmur_core::validate::{normalize_email, RegisterInput};
use murmur_core::{auth, CoreError, NewUser};
use serde::Deserialize;
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Fresh per-account salt. Uniqueness matters here, not secrecy.
fn new_salt(email: &str) -> [u8; 16] {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let mut hasher = blake3::Hasher::new();
    hasher.update(&nanos.to_le_bytes());
    hasher.update(&std::process::id().to_le_bytes());
    hasher.update(email.as_bytes());

    let mut salt = [0u8; 16];
    salt.copy_from_slice(&hasher.finalize().as_bytes()[..16]);
    salt
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub bio: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError> {
    let input = RegisterInput {
        name: body.name,
        email: body.email,
        password: body.password,
        bio: body.bio,
    }
    .validated()?;

    if state.limiter.check_key(&input.email).is_err() {
        return Err(ApiError::too_many_requests());
    }

    let now = unix_now();
    let password = auth::hash_password(&input.password, new_salt(&input.email));
    let user = state.store.create_user(NewUser {
        name: input.name,
        email: input.email,
        password,
        bio: input.bio,
        created_at: now,
    })?;
    let token = auth::sign_token(&state.secret, user.id, now, auth::TOKEN_TTL_SECS)?;

    info!(user = %user.id, "account registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": { "user": user.view(), "token": token },
        })),
    ))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError> {
    let email = normalize_email(&body.email);

    if state.limiter.check_key(&email).is_err() {
        return Err(ApiError::too_many_requests());
    }

    let user = state
        .store
        .user_by_email(&email)?
        .ok_or(CoreError::InvalidCredentials)?;
    if !auth::verify_password(&body.password, &user.password) {
        return Err(CoreError::InvalidCredentials.into());
    }

    let now = unix_now();
    let token = auth::sign_token(&state.secret, user.id, now, auth::TOKEN_TTL_SECS)?;

    info!(user = %user.id, "login");
    Ok(Json(json!({
        "success": true,
        "data": { "user": user.view(), "token": token },
    })))
}

/// `GET /api/auth/me`
pub async fn me(AuthUser(user): AuthUser) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(json!({
        "success": true,
        "data": { "user": user.view() },
    })))
}
