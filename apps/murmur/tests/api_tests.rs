//! Integration tests for the HTTP API.
//!
//! Runs the full router over an in-memory store.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use murmur::api::{router, AppState};
use murmur_core::MemStore;
use serde_json::{json, Value};
use std::sync::Arc;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

const SECRET: [u8; 32] = [42; 32];

/// Spin up a server over a fresh in-memory store.
fn test_server() -> TestServer {
    let state = AppState::new(Arc::new(MemStore::new(SECRET)), SECRET);
    TestServer::new(router(state)).unwrap()
}

/// Register an account and return its bearer token.
async fn register(server: &TestServer, name: &str, email: &str) -> String {
    let res = server
        .post("/api/auth/register")
        .json(&json!({
            "name": name,
            "email": email,
            "password": "hunter42",
        }))
        .await;
    assert_eq!(res.status_code(), StatusCode::CREATED);

    let body: Value = res.json();
    body["data"]["token"].as_str().unwrap().to_string()
}

/// Create a text-only post and return its id.
async fn create_post(server: &TestServer, token: &str, text: &str) -> u64 {
    let form = MultipartForm::new().add_text("text", text);
    let res = server
        .post("/api/posts")
        .authorization_bearer(token)
        .multipart(form)
        .await;
    assert_eq!(res.status_code(), StatusCode::CREATED);

    let body: Value = res.json();
    body["data"]["post"]["id"].as_u64().unwrap()
}

fn png_part(bytes: Vec<u8>) -> Part {
    Part::bytes(bytes).file_name("pic.png").mime_type("image/png")
}

// =============================================================================
// HEALTH
// =============================================================================

#[tokio::test]
async fn health_reports_ok() {
    let server = test_server();
    let res = server.get("/health").await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let body: Value = res.json();
    assert_eq!(body["status"], "ok");
}

// =============================================================================
// AUTH
// =============================================================================

#[tokio::test]
async fn register_then_me() {
    let server = test_server();
    let token = register(&server, "Alice", "alice@example.com").await;

    let res = server.get("/api/auth/me").authorization_bearer(&token).await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let body: Value = res.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["email"], "alice@example.com");
    assert!(body["data"]["user"].get("password").is_none());
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let server = test_server();
    register(&server, "Alice", "alice@example.com").await;

    let res = server
        .post("/api/auth/register")
        .json(&json!({
            "name": "Other Alice",
            "email": "Alice@Example.com",
            "password": "hunter42",
        }))
        .await;
    assert_eq!(res.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn register_reports_every_invalid_field() {
    let server = test_server();
    let res = server
        .post("/api/auth/register")
        .json(&json!({
            "name": "",
            "email": "not-an-email",
            "password": "abc",
        }))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);

    let body: Value = res.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn login_round_trip() {
    let server = test_server();
    register(&server, "Alice", "alice@example.com").await;

    let res = server
        .post("/api/auth/login")
        .json(&json!({ "email": " ALICE@example.com ", "password": "hunter42" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let body: Value = res.json();
    assert!(body["data"]["token"].as_str().is_some());
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let server = test_server();
    register(&server, "Alice", "alice@example.com").await;

    let wrong_password = server
        .post("/api/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": "wrong!!" }))
        .await;
    assert_eq!(wrong_password.status_code(), StatusCode::UNAUTHORIZED);

    let unknown_email = server
        .post("/api/auth/login")
        .json(&json!({ "email": "nobody@example.com", "password": "hunter42" }))
        .await;
    assert_eq!(unknown_email.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rate_limited_per_email() {
    let server = test_server();
    register(&server, "Alice", "alice@example.com").await;

    let mut last = StatusCode::OK;
    for _ in 0..11 {
        let res = server
            .post("/api/auth/login")
            .json(&json!({ "email": "alice@example.com", "password": "wrong!!" }))
            .await;
        last = res.status_code();
    }
    assert_eq!(last, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn protected_routes_require_token() {
    let server = test_server();

    let no_token = server.get("/api/auth/me").await;
    assert_eq!(no_token.status_code(), StatusCode::UNAUTHORIZED);

    let garbage = server
        .get("/api/auth/me")
        .authorization_bearer("not-a-token")
        .await;
    assert_eq!(garbage.status_code(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// POSTS
// =============================================================================

#[tokio::test]
async fn create_post_and_read_feed() {
    let server = test_server();
    let token = register(&server, "Alice", "alice@example.com").await;

    create_post(&server, &token, "first!").await;
    create_post(&server, &token, "second!").await;

    let res = server.get("/api/posts").await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let body: Value = res.json();
    let posts = body["data"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 2);
    // Newest first; same timestamp falls back to descending id.
    assert_eq!(posts[0]["text"], "second!");
    assert_eq!(posts[1]["text"], "first!");
    assert_eq!(posts[0]["author"]["name"], "Alice");
    assert_eq!(posts[0]["author"]["email"], "alice@example.com");
}

#[tokio::test]
async fn create_post_with_image() {
    let server = test_server();
    let token = register(&server, "Alice", "alice@example.com").await;

    let form = MultipartForm::new()
        .add_text("text", "look at this")
        .add_part("images", png_part(vec![0x89, b'P', b'N', b'G']));
    let res = server
        .post("/api/posts")
        .authorization_bearer(&token)
        .multipart(form)
        .await;
    assert_eq!(res.status_code(), StatusCode::CREATED);

    let body: Value = res.json();
    let images = body["data"]["post"]["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    assert!(images[0]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn image_only_post_is_allowed() {
    let server = test_server();
    let token = register(&server, "Alice", "alice@example.com").await;

    let form = MultipartForm::new()
        .add_text("text", "")
        .add_part("images", png_part(vec![1, 2, 3]));
    let res = server
        .post("/api/posts")
        .authorization_bearer(&token)
        .multipart(form)
        .await;
    assert_eq!(res.status_code(), StatusCode::CREATED);
}

#[tokio::test]
async fn empty_post_is_rejected() {
    let server = test_server();
    let token = register(&server, "Alice", "alice@example.com").await;

    let form = MultipartForm::new().add_text("text", "   ");
    let res = server
        .post("/api/posts")
        .authorization_bearer(&token)
        .multipart(form)
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_rejects_unsupported_image_type() {
    let server = test_server();
    let token = register(&server, "Alice", "alice@example.com").await;

    let form = MultipartForm::new().add_text("text", "pdf attached").add_part(
        "images",
        Part::bytes(vec![1, 2, 3])
            .file_name("doc.pdf")
            .mime_type("application/pdf"),
    );
    let res = server
        .post("/api/posts")
        .authorization_bearer(&token)
        .multipart(form)
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_rejects_too_many_images() {
    let server = test_server();
    let token = register(&server, "Alice", "alice@example.com").await;

    let mut form = MultipartForm::new().add_text("text", "gallery");
    for _ in 0..6 {
        form = form.add_part("images", png_part(vec![1, 2, 3]));
    }
    let res = server
        .post("/api/posts")
        .authorization_bearer(&token)
        .multipart(form)
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn posts_by_user_filters_author() {
    let server = test_server();
    let alice = register(&server, "Alice", "alice@example.com").await;
    let bob = register(&server, "Bob", "bob@example.com").await;

    create_post(&server, &alice, "from alice").await;
    create_post(&server, &bob, "from bob").await;

    let me = server.get("/api/auth/me").authorization_bearer(&bob).await;
    let bob_id = me.json::<Value>()["data"]["user"]["id"].as_u64().unwrap();

    let res = server.get(&format!("/api/posts/user/{bob_id}")).await;
    let body: Value = res.json();
    let posts = body["data"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["text"], "from bob");
}

#[tokio::test]
async fn owner_can_edit_post() {
    let server = test_server();
    let token = register(&server, "Alice", "alice@example.com").await;
    let post_id = create_post(&server, &token, "draft").await;

    let form = MultipartForm::new().add_text("text", "final");
    let res = server
        .put(&format!("/api/posts/{post_id}"))
        .authorization_bearer(&token)
        .multipart(form)
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let body: Value = res.json();
    assert_eq!(body["data"]["post"]["text"], "final");
}

#[tokio::test]
async fn edit_keeps_echoed_images_and_drops_the_rest() {
    let server = test_server();
    let token = register(&server, "Alice", "alice@example.com").await;

    let form = MultipartForm::new()
        .add_text("text", "two pics")
        .add_part("images", png_part(vec![1]))
        .add_part("images", png_part(vec![2]));
    let res = server
        .post("/api/posts")
        .authorization_bearer(&token)
        .multipart(form)
        .await;
    let body: Value = res.json();
    let post_id = body["data"]["post"]["id"].as_u64().unwrap();
    let kept = body["data"]["post"]["images"][0].as_str().unwrap().to_string();

    let form = MultipartForm::new()
        .add_text("text", "one pic now")
        .add_text("existingImages", kept.as_str());
    let res = server
        .put(&format!("/api/posts/{post_id}"))
        .authorization_bearer(&token)
        .multipart(form)
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let body: Value = res.json();
    let images = body["data"]["post"]["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0], kept.as_str());
}

#[tokio::test]
async fn non_owner_cannot_edit_or_delete() {
    let server = test_server();
    let alice = register(&server, "Alice", "alice@example.com").await;
    let bob = register(&server, "Bob", "bob@example.com").await;
    let post_id = create_post(&server, &alice, "mine").await;

    let form = MultipartForm::new().add_text("text", "hijacked");
    let edit = server
        .put(&format!("/api/posts/{post_id}"))
        .authorization_bearer(&bob)
        .multipart(form)
        .await;
    assert_eq!(edit.status_code(), StatusCode::FORBIDDEN);

    let delete = server
        .delete(&format!("/api/posts/{post_id}"))
        .authorization_bearer(&bob)
        .await;
    assert_eq!(delete.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn delete_removes_post_and_comments() {
    let server = test_server();
    let token = register(&server, "Alice", "alice@example.com").await;
    let post_id = create_post(&server, &token, "short-lived").await;

    let res = server
        .post(&format!("/api/posts/{post_id}/comments"))
        .authorization_bearer(&token)
        .json(&json!({ "text": "soon gone" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::CREATED);

    let res = server
        .delete(&format!("/api/posts/{post_id}"))
        .authorization_bearer(&token)
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let feed = server.get("/api/posts").await;
    assert!(feed.json::<Value>()["data"]["posts"]
        .as_array()
        .unwrap()
        .is_empty());

    let comments = server.get(&format!("/api/posts/{post_id}/comments")).await;
    assert_eq!(comments.status_code(), StatusCode::NOT_FOUND);
}

// =============================================================================
// LIKES
// =============================================================================

#[tokio::test]
async fn like_toggles_on_and_off() {
    let server = test_server();
    let alice = register(&server, "Alice", "alice@example.com").await;
    let bob = register(&server, "Bob", "bob@example.com").await;
    let post_id = create_post(&server, &alice, "like me").await;

    let res = server
        .put(&format!("/api/posts/{post_id}/like"))
        .authorization_bearer(&bob)
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.json::<Value>()["data"]["post"]["likeCount"], 1);

    let res = server
        .put(&format!("/api/posts/{post_id}/like"))
        .authorization_bearer(&bob)
        .await;
    assert_eq!(res.json::<Value>()["data"]["post"]["likeCount"], 0);
}

#[tokio::test]
async fn like_missing_post_is_404() {
    let server = test_server();
    let token = register(&server, "Alice", "alice@example.com").await;

    let res = server
        .put("/api/posts/9999/like")
        .authorization_bearer(&token)
        .await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

// =============================================================================
// COMMENTS
// =============================================================================

#[tokio::test]
async fn comments_list_oldest_first_without_emails() {
    let server = test_server();
    let alice = register(&server, "Alice", "alice@example.com").await;
    let bob = register(&server, "Bob", "bob@example.com").await;
    let post_id = create_post(&server, &alice, "discuss").await;

    for (token, text) in [(&alice, "first"), (&bob, "second")] {
        let res = server
            .post(&format!("/api/posts/{post_id}/comments"))
            .authorization_bearer(token)
            .json(&json!({ "text": text }))
            .await;
        assert_eq!(res.status_code(), StatusCode::CREATED);
    }

    let res = server.get(&format!("/api/posts/{post_id}/comments")).await;
    let body: Value = res.json();
    let comments = body["data"]["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["text"], "first");
    assert_eq!(comments[1]["text"], "second");
    // Comment authors carry no email.
    assert!(comments[0]["author"].get("email").is_none());
}

#[tokio::test]
async fn comment_on_missing_post_is_404() {
    let server = test_server();
    let token = register(&server, "Alice", "alice@example.com").await;

    let res = server
        .post("/api/posts/9999/comments")
        .authorization_bearer(&token)
        .json(&json!({ "text": "into the void" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_comment_is_rejected() {
    let server = test_server();
    let token = register(&server, "Alice", "alice@example.com").await;
    let post_id = create_post(&server, &token, "quiet please").await;

    let res = server
        .post(&format!("/api/posts/{post_id}/comments"))
        .authorization_bearer(&token)
        .json(&json!({ "text": "   " }))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// USERS
// =============================================================================

#[tokio::test]
async fn public_profile_is_readable_without_auth() {
    let server = test_server();
    let token = register(&server, "Alice", "alice@example.com").await;

    let me = server.get("/api/auth/me").authorization_bearer(&token).await;
    let id = me.json::<Value>()["data"]["user"]["id"].as_u64().unwrap();

    let res = server.get(&format!("/api/users/{id}")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.json::<Value>()["data"]["user"]["name"], "Alice");

    let missing = server.get("/api/users/9999").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_picture_upload() {
    let server = test_server();
    let token = register(&server, "Alice", "alice@example.com").await;

    let form = MultipartForm::new().add_part("image", png_part(vec![9, 9, 9]));
    let res = server
        .put("/api/users/pfp")
        .authorization_bearer(&token)
        .multipart(form)
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let body: Value = res.json();
    assert!(body["data"]["user"]["profilePicture"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));

    // The new picture shows up on post author views too.
    create_post(&server, &token, "new look").await;
    let feed = server.get("/api/posts").await;
    let body: Value = feed.json();
    assert!(body["data"]["posts"][0]["author"]["profilePicture"]
        .as_str()
        .is_some());
}

#[tokio::test]
async fn profile_picture_requires_file() {
    let server = test_server();
    let token = register(&server, "Alice", "alice@example.com").await;

    let form = MultipartForm::new().add_text("caption", "no file here");
    let res = server
        .put("/api/users/pfp")
        .authorization_bearer(&token)
        .multipart(form)
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
}
