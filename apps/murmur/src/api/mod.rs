//! # HTTP API
//!
//! The axum REST layer over `murmur-core`.
//!
//! Every response uses the `{ "success": bool, ... }` envelope: payloads
//! ride under `data`, failures carry `message` (and `errors` for
//! validation). Protected routes take a bearer token via the
//! [`extract::AuthUser`] extractor.

pub mod auth;
pub mod error;
pub mod extract;
pub mod posts;
pub mod upload;
pub mod users;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use murmur_core::SocialStore;
use serde_json::json;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Request body cap: 5 images at 3 MiB plus multipart overhead.
const BODY_LIMIT: usize = 20 * 1024 * 1024;

/// Login/register attempts allowed per key per minute.
const AUTH_ATTEMPTS_PER_MINUTE: u32 = 10;

/// Keyed rate limiter for credential endpoints.
pub type AuthLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SocialStore>,
    pub secret: [u8; 32],
    pub limiter: Arc<AuthLimiter>,
}

impl AppState {
    /// Build state over any store implementation.
    #[must_use]
    pub fn new(store: Arc<dyn SocialStore>, secret: [u8; 32]) -> Self {
        let per_minute =
            NonZeroU32::new(AUTH_ATTEMPTS_PER_MINUTE).unwrap_or(NonZeroU32::MIN);
        Self {
            store,
            secret,
            limiter: Arc::new(RateLimiter::keyed(Quota::per_minute(per_minute))),
        }
    }
}

/// Current unix time in seconds.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Assemble the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/posts", get(posts::feed).post(posts::create))
        .route("/api/posts/user/{id}", get(posts::by_user))
        .route("/api/posts/{id}", put(posts::update).delete(posts::remove))
        .route("/api/posts/{id}/like", put(posts::like))
        .route(
            "/api/posts/{id}/comments",
            get(posts::comments).post(posts::comment),
        )
        .route("/api/users/{id}", get(users::profile))
        .route("/api/users/pfp", put(users::update_avatar))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([CONTENT_TYPE, AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
