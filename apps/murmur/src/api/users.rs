//! User endpoints: public profiles and the profile picture upload.

use super::error::ApiError;
use super::extract::AuthUser;
use super::upload::read_single_image;
use super::AppState;
use axum::extract::{Multipart, Path, State};
use axum::response::IntoResponse;
use axum::Json;
use murmur_core::{image, UserId, MAX_AVATAR_BYTES};
use serde_json::json;
use tracing::info;

/// `GET /api/users/{id}`
pub async fn profile(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.store.user(UserId(id))?;
    Ok(Json(json!({ "success": true, "data": { "user": user.view() } })))
}

/// `PUT /api/users/pfp`
pub async fn update_avatar(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let upload = read_single_image(multipart, "image")
        .await?
        .ok_or_else(|| ApiError::bad_request("image file is required"))?;
    let data_url = image::encode_data_url(&upload.mime, &upload.bytes, MAX_AVATAR_BYTES)?;

    let updated = state.store.set_profile_picture(user.id, data_url)?;
    info!(user = %updated.id, "profile picture updated");

    Ok(Json(json!({ "success": true, "data": { "user": updated.view() } })))
}
