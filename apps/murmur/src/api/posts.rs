//! Post endpoints: feed, create/edit/delete, likes, comments.

use super::error::ApiError;
use super::extract::AuthUser;
use super::upload::{read_post_form, PostForm, UploadedImage};
use super::{unix_now, AppState};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use murmur_core::store::{populate_comment, populate_comments, populate_post, populate_posts};
use murmur_core::{
    image, validate, CoreError, NewComment, NewPost, PostId, PostPatch, UserId, FEED_LIMIT,
    MAX_IMAGES_PER_POST, MAX_IMAGE_BYTES,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

/// Encode freshly uploaded files as data URLs.
fn encode_uploads(images: &[UploadedImage]) -> Result<Vec<String>, CoreError> {
    images
        .iter()
        .map(|img| image::encode_data_url(&img.mime, &img.bytes, MAX_IMAGE_BYTES))
        .collect()
}

/// Resolve the final image list for a post revision: kept data URLs are
/// re-checked, new uploads encoded, and the combined count capped.
fn resolve_images(form: &PostForm) -> Result<Vec<String>, CoreError> {
    for url in &form.existing_images {
        image::check_data_url(url, MAX_IMAGE_BYTES)?;
    }
    let mut images = form.existing_images.clone();
    images.extend(encode_uploads(&form.images)?);

    if images.len() > MAX_IMAGES_PER_POST {
        return Err(CoreError::invalid(
            "images",
            format!("A post can include at most {MAX_IMAGES_PER_POST} images"),
        ));
    }
    Ok(images)
}

/// `GET /api/posts`
pub async fn feed(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let posts = state.store.feed(FEED_LIMIT)?;
    let views = populate_posts(state.store.as_ref(), posts)?;
    Ok(Json(json!({ "success": true, "data": { "posts": views } })))
}

/// `POST /api/posts`
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_post_form(multipart).await?;
    // Creation starts from a blank revision, so kept images are ignored.
    let images = {
        let fresh = PostForm {
            text: String::new(),
            existing_images: Vec::new(),
            images: form.images,
        };
        resolve_images(&fresh)?
    };
    let text = validate::post_text(&form.text, images.len())?;

    let post = state.store.create_post(NewPost {
        author: user.id,
        text,
        images,
        created_at: unix_now(),
    })?;
    info!(post = %post.id, author = %user.id, "post created");

    let view = populate_post(state.store.as_ref(), post)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": { "post": view } })),
    ))
}

/// `GET /api/posts/user/{id}`
pub async fn by_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state.store.posts_by_author(UserId(id))?;
    let views = populate_posts(state.store.as_ref(), posts)?;
    Ok(Json(json!({ "success": true, "data": { "posts": views } })))
}

/// `PUT /api/posts/{id}`
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<u64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_post_form(multipart).await?;
    let images = resolve_images(&form)?;
    let text = validate::post_text(&form.text, images.len())?;

    let post = state.store.update_post(
        PostId(id),
        user.id,
        PostPatch {
            text,
            images,
            updated_at: unix_now(),
        },
    )?;
    info!(post = %post.id, "post updated");

    let view = populate_post(state.store.as_ref(), post)?;
    Ok(Json(json!({ "success": true, "data": { "post": view } })))
}

/// `DELETE /api/posts/{id}`
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.delete_post(PostId(id), user.id)?;
    info!(post = %PostId(id), "post deleted");
    Ok(Json(json!({ "success": true, "data": {} })))
}

/// `PUT /api/posts/{id}/like`
pub async fn like(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.store.toggle_like(PostId(id), user.id)?;
    let view = populate_post(state.store.as_ref(), post)?;
    Ok(Json(json!({ "success": true, "data": { "post": view } })))
}

/// `GET /api/posts/{id}/comments`
pub async fn comments(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = state.store.comments_for_post(PostId(id))?;
    let views = populate_comments(state.store.as_ref(), comments)?;
    Ok(Json(json!({ "success": true, "data": { "comments": views } })))
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub text: String,
}

/// `POST /api/posts/{id}/comments`
pub async fn comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<u64>,
    Json(body): Json<CommentBody>,
) -> Result<impl IntoResponse, ApiError> {
    let text = validate::comment_text(&body.text)?;
    let created = state.store.create_comment(NewComment {
        post: PostId(id),
        author: user.id,
        text,
        created_at: unix_now(),
    })?;
    info!(post = %PostId(id), comment = %created.id, "comment added");

    let view = populate_comment(state.store.as_ref(), created)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": { "comment": view } })),
    ))
}
