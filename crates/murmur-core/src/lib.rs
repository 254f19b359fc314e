//! # Murmur Core - THE LOGIC
//!
//! Pure domain layer for Murmur, a small social-feed service: users,
//! posts, likes, comments, and profiles.
//!
//! This crate is synchronous and network-free. It owns:
//!
//! - the stored records and their populated view types ([`model`])
//! - input validation ([`validate`])
//! - inline base64 image handling ([`image`])
//! - password hashing and bearer tokens ([`auth`])
//! - the [`store::SocialStore`] trait with in-memory and redb-backed
//!   implementations
//!
//! The HTTP server and CLI live in `apps/murmur`; the typed client in
//! `crates/murmur-sdk`.

pub mod auth;
pub mod error;
pub mod image;
pub mod model;
pub mod primitives;
pub mod store;
pub mod validate;

pub use error::{CoreError, FieldError};
pub use model::{AuthorView, Comment, CommentView, Post, PostView, User, UserView};
pub use primitives::{
    CommentId, PostId, UserId, FEED_LIMIT, MAX_AVATAR_BYTES, MAX_BIO, MAX_COMMENT_TEXT,
    MAX_IMAGES_PER_POST, MAX_IMAGE_BYTES, MAX_NAME, MAX_POST_TEXT, MIN_PASSWORD,
};
pub use store::{
    populate_comment, populate_comments, populate_post, populate_posts, MemStore, NewComment,
    NewPost, NewUser, PostPatch, RedbStore, SocialStore, StoreCounts,
};
