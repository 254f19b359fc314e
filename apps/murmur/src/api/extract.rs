//! Authenticated-user extractor.
//!
//! Handlers that take [`AuthUser`] only run with a valid, unexpired
//! bearer token whose user still exists. Everything else is a 401.

use super::error::ApiError;
use super::{unix_now, AppState};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use murmur_core::{auth, User};

/// The authenticated caller, resolved from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(ApiError::unauthorized)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(ApiError::unauthorized)?;

        let claims = auth::verify_token(&state.secret, token, unix_now())?;
        // A token can outlive its account only if the store was reset.
        let user = state
            .store
            .user(claims.user)
            .map_err(|_| ApiError::unauthorized())?;

        Ok(Self(user))
    }
}
