//! # Murmur SDK - The Client
//!
//! Typed HTTP client for the Murmur API.
//!
//! Every server response uses the `{ "success": bool, ... }` envelope;
//! this crate unwraps it and surfaces failures as [`Error::Api`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use murmur_sdk::MurmurClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), murmur_sdk::Error> {
//!     let client = MurmurClient::new("http://localhost:4000");
//!
//!     // Register and pick up the session token
//!     let session = client
//!         .register("Alice", "alice@example.com", "hunter42", "")
//!         .await?;
//!     let client = client.with_token(&session.token)?;
//!
//!     // Post, like, comment
//!     let post = client.create_post("hello, murmur!").await?;
//!     client.toggle_like(post.id).await?;
//!     client.add_comment(post.id, "replying to myself").await?;
//!
//!     for post in client.feed().await? {
//!         println!("{}: {}", post.author.name, post.text);
//!     }
//!     Ok(())
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// ERROR TYPE
// =============================================================================

/// Errors from the Murmur SDK.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned a failure envelope.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

// =============================================================================
// API TYPES
// =============================================================================

/// A public user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub bio: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub profile_picture: Option<String>,
    pub created_at: u64,
}

/// Author summary embedded in posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub profile_picture: Option<String>,
}

/// A post with its author populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub text: String,
    /// Base64 `data:` URLs.
    pub images: Vec<String>,
    pub likes: Vec<u64>,
    pub like_count: usize,
    pub author: Author,
    pub created_at: u64,
    pub updated_at: u64,
}

/// A comment with its author populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub post: u64,
    pub text: String,
    pub author: Author,
    pub created_at: u64,
}

/// Result of `register` or `login`.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Health check response.
#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    pub status: String,
    pub version: String,
}

/// An image to attach to a post or profile.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    /// e.g. `image/png`.
    pub mime: String,
    pub bytes: Vec<u8>,
}

// =============================================================================
// ENVELOPE
// =============================================================================

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default = "Option::default")]
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    user: User,
}

#[derive(Debug, Deserialize)]
struct PostData {
    post: Post,
}

#[derive(Debug, Deserialize)]
struct PostsData {
    posts: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct CommentData {
    comment: Comment,
}

#[derive(Debug, Deserialize)]
struct CommentsData {
    comments: Vec<Comment>,
}

/// Unwrap a response envelope, turning failures into [`Error::Api`].
async fn unwrap_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status().as_u16();
    let envelope: Envelope<T> = resp.json().await?;

    if !envelope.success {
        return Err(Error::Api {
            status,
            message: envelope
                .message
                .unwrap_or_else(|| "unknown server error".to_string()),
        });
    }
    envelope.data.ok_or(Error::Api {
        status,
        message: "missing data in response".to_string(),
    })
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client for the Murmur server.
#[derive(Debug, Clone)]
pub struct MurmurClient {
    base_url: String,
    client: reqwest::Client,
}

impl MurmurClient {
    /// Create an unauthenticated client for the given base URL.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let client = MurmurClient::new("http://localhost:4000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Create a client that sends `Authorization: Bearer <token>` with
    /// every request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] if the token contains invalid header
    /// characters.
    pub fn with_token(&self, token: &str) -> Result<Self, Error> {
        use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
            Error::Api {
                status: 0,
                message: format!("Invalid token header: {}", e),
            }
        })?;
        headers.insert(AUTHORIZATION, value);
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .default_headers(headers)
            .build()?;
        Ok(Self {
            base_url: self.base_url.clone(),
            client,
        })
    }

    // --- health ---

    /// Health check.
    pub async fn health(&self) -> Result<Health, Error> {
        let url = format!("{}/health", self.base_url);
        let resp = self.client.get(&url).send().await?.json().await?;
        Ok(resp)
    }

    // --- auth ---

    /// Register a new account.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        bio: &str,
    ) -> Result<Session, Error> {
        let url = format!("{}/api/auth/register", self.base_url);
        let body = serde_json::json!({
            "name": name,
            "email": email,
            "password": password,
            "bio": bio,
        });
        let resp = self.client.post(&url).json(&body).send().await?;
        unwrap_envelope(resp).await
    }

    /// Log in with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, Error> {
        let url = format!("{}/api/auth/login", self.base_url);
        let body = serde_json::json!({ "email": email, "password": password });
        let resp = self.client.post(&url).json(&body).send().await?;
        unwrap_envelope(resp).await
    }

    /// Fetch the account behind the current token.
    pub async fn me(&self) -> Result<User, Error> {
        let url = format!("{}/api/auth/me", self.base_url);
        let resp = self.client.get(&url).send().await?;
        let data: UserData = unwrap_envelope(resp).await?;
        Ok(data.user)
    }

    // --- posts ---

    /// Fetch the main feed, newest first.
    pub async fn feed(&self) -> Result<Vec<Post>, Error> {
        let url = format!("{}/api/posts", self.base_url);
        let resp = self.client.get(&url).send().await?;
        let data: PostsData = unwrap_envelope(resp).await?;
        Ok(data.posts)
    }

    /// Fetch all posts by one author, newest first.
    pub async fn posts_by_user(&self, user_id: u64) -> Result<Vec<Post>, Error> {
        let url = format!("{}/api/posts/user/{}", self.base_url, user_id);
        let resp = self.client.get(&url).send().await?;
        let data: PostsData = unwrap_envelope(resp).await?;
        Ok(data.posts)
    }

    /// Create a text-only post.
    pub async fn create_post(&self, text: &str) -> Result<Post, Error> {
        self.create_post_with_images(text, Vec::new()).await
    }

    /// Create a post with attached images.
    pub async fn create_post_with_images(
        &self,
        text: &str,
        images: Vec<ImageUpload>,
    ) -> Result<Post, Error> {
        let url = format!("{}/api/posts", self.base_url);
        let form = post_form(text, &[], images)?;
        let resp = self.client.post(&url).multipart(form).send().await?;
        let data: PostData = unwrap_envelope(resp).await?;
        Ok(data.post)
    }

    /// Replace a post's content. `kept_images` are data URLs from the
    /// current revision to carry over.
    pub async fn update_post(
        &self,
        post_id: u64,
        text: &str,
        kept_images: &[String],
        new_images: Vec<ImageUpload>,
    ) -> Result<Post, Error> {
        let url = format!("{}/api/posts/{}", self.base_url, post_id);
        let form = post_form(text, kept_images, new_images)?;
        let resp = self.client.put(&url).multipart(form).send().await?;
        let data: PostData = unwrap_envelope(resp).await?;
        Ok(data.post)
    }

    /// Delete one of the caller's posts.
    pub async fn delete_post(&self, post_id: u64) -> Result<(), Error> {
        let url = format!("{}/api/posts/{}", self.base_url, post_id);
        let resp = self.client.delete(&url).send().await?;
        let _: serde_json::Value = unwrap_envelope(resp).await?;
        Ok(())
    }

    /// Flip the caller's like on a post; returns the updated post.
    pub async fn toggle_like(&self, post_id: u64) -> Result<Post, Error> {
        let url = format!("{}/api/posts/{}/like", self.base_url, post_id);
        let resp = self.client.put(&url).send().await?;
        let data: PostData = unwrap_envelope(resp).await?;
        Ok(data.post)
    }

    // --- comments ---

    /// Fetch a post's comments, oldest first.
    pub async fn comments(&self, post_id: u64) -> Result<Vec<Comment>, Error> {
        let url = format!("{}/api/posts/{}/comments", self.base_url, post_id);
        let resp = self.client.get(&url).send().await?;
        let data: CommentsData = unwrap_envelope(resp).await?;
        Ok(data.comments)
    }

    /// Add a comment to a post.
    pub async fn add_comment(&self, post_id: u64, text: &str) -> Result<Comment, Error> {
        let url = format!("{}/api/posts/{}/comments", self.base_url, post_id);
        let body = serde_json::json!({ "text": text });
        let resp = self.client.post(&url).json(&body).send().await?;
        let data: CommentData = unwrap_envelope(resp).await?;
        Ok(data.comment)
    }

    // --- users ---

    /// Fetch a public profile.
    pub async fn user(&self, user_id: u64) -> Result<User, Error> {
        let url = format!("{}/api/users/{}", self.base_url, user_id);
        let resp = self.client.get(&url).send().await?;
        let data: UserData = unwrap_envelope(resp).await?;
        Ok(data.user)
    }

    /// Replace the caller's profile picture.
    pub async fn set_profile_picture(&self, image: ImageUpload) -> Result<User, Error> {
        let url = format!("{}/api/users/pfp", self.base_url);
        let part = image_part(image)?;
        let form = reqwest::multipart::Form::new().part("image", part);
        let resp = self.client.put(&url).multipart(form).send().await?;
        let data: UserData = unwrap_envelope(resp).await?;
        Ok(data.user)
    }
}

// =============================================================================
// MULTIPART HELPERS
// =============================================================================

fn image_part(image: ImageUpload) -> Result<reqwest::multipart::Part, Error> {
    reqwest::multipart::Part::bytes(image.bytes)
        .file_name(image.file_name)
        .mime_str(&image.mime)
        .map_err(Error::Http)
}

fn post_form(
    text: &str,
    kept_images: &[String],
    new_images: Vec<ImageUpload>,
) -> Result<reqwest::multipart::Form, Error> {
    let mut form = reqwest::multipart::Form::new().text("text", text.to_string());
    for url in kept_images {
        form = form.text("existingImages", url.clone());
    }
    for image in new_images {
        form = form.part("images", image_part(image)?);
    }
    Ok(form)
}
