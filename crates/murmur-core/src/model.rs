//! # Domain Records and Views
//!
//! Stored records (`User`, `Post`, `Comment`) and the populated view
//! types the API serializes.
//!
//! Views are the analog of the original document-mapper's `populate`
//! hook: a stored record references its author by id only, and the view
//! embeds the author summary that every read path attaches. Credentials
//! never leave this module; `UserView` is built by stripping them.

use crate::auth::PasswordRecord;
use crate::{CommentId, PostId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// STORED RECORDS
// =============================================================================

/// A registered account as persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Stored lowercase; uniqueness is enforced by the store.
    pub email: String,
    pub password: PasswordRecord,
    pub bio: String,
    /// Base64 `data:` URL, if set.
    pub profile_picture: Option<String>,
    /// Unix seconds.
    pub created_at: u64,
}

/// A post: text and/or inline images, owned by exactly one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author: UserId,
    pub text: String,
    /// Base64 `data:` URLs, at most `MAX_IMAGES_PER_POST`.
    pub images: Vec<String>,
    /// Like set membership; one entry per user, toggled idempotently.
    pub likes: BTreeSet<UserId>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Post {
    /// Whether the given user currently likes this post.
    #[must_use]
    pub fn liked_by(&self, user: UserId) -> bool {
        self.likes.contains(&user)
    }

    /// Flip the user's like. Returns `true` if the post is now liked.
    ///
    /// Toggling twice restores the original set.
    pub fn toggle_like(&mut self, user: UserId) -> bool {
        if self.likes.remove(&user) {
            false
        } else {
            self.likes.insert(user);
            true
        }
    }
}

/// A text reply to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post: PostId,
    pub author: UserId,
    pub text: String,
    pub created_at: u64,
}

// =============================================================================
// POPULATED VIEWS
// =============================================================================

/// Public profile record: everything except credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub bio: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub profile_picture: Option<String>,
    pub created_at: u64,
}

/// Author summary embedded into posts and comments.
///
/// Post views carry the author's email; comment views omit it, matching
/// the narrower projection the original read hooks used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    pub id: UserId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub profile_picture: Option<String>,
}

/// A post with its author populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: PostId,
    pub text: String,
    pub images: Vec<String>,
    pub likes: Vec<UserId>,
    pub like_count: usize,
    pub author: AuthorView,
    pub created_at: u64,
    pub updated_at: u64,
}

/// A comment with its author populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: CommentId,
    pub post: PostId,
    pub text: String,
    pub author: AuthorView,
    pub created_at: u64,
}

impl User {
    /// Credential-free projection of this account.
    #[must_use]
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            bio: self.bio.clone(),
            profile_picture: self.profile_picture.clone(),
            created_at: self.created_at,
        }
    }

    /// Author summary for post views (includes email).
    #[must_use]
    pub fn post_author(&self) -> AuthorView {
        AuthorView {
            id: self.id,
            name: self.name.clone(),
            email: Some(self.email.clone()),
            profile_picture: self.profile_picture.clone(),
        }
    }

    /// Author summary for comment views (no email).
    #[must_use]
    pub fn comment_author(&self) -> AuthorView {
        AuthorView {
            id: self.id,
            name: self.name.clone(),
            email: None,
            profile_picture: self.profile_picture.clone(),
        }
    }
}

impl PostView {
    /// Assemble a view from a post and its author record.
    #[must_use]
    pub fn populate(post: Post, author: &User) -> Self {
        Self {
            id: post.id,
            text: post.text,
            images: post.images,
            like_count: post.likes.len(),
            likes: post.likes.into_iter().collect(),
            author: author.post_author(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl CommentView {
    /// Assemble a view from a comment and its author record.
    #[must_use]
    pub fn populate(comment: Comment, author: &User) -> Self {
        Self {
            id: comment.id,
            post: comment.post,
            text: comment.text,
            author: author.comment_author(),
            created_at: comment.created_at,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
