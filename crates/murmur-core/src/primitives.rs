//! # Primitives
//!
//! Identifier newtypes and domain limits shared across the crate.
//!
//! All identifiers are `u64` newtypes allocated monotonically by the
//! store. Timestamps everywhere are integer unix seconds.

use serde::{Deserialize, Serialize};

// =============================================================================
// DOMAIN LIMITS
// =============================================================================

/// Maximum post text length in characters.
pub const MAX_POST_TEXT: usize = 500;

/// Maximum number of inline images per post.
pub const MAX_IMAGES_PER_POST: usize = 5;

/// Maximum decoded size of a single post image (3 MiB).
pub const MAX_IMAGE_BYTES: usize = 3 * 1024 * 1024;

/// Maximum decoded size of a profile picture. Shares the post-image
/// cap; uploads go through one size limit regardless of field.
pub const MAX_AVATAR_BYTES: usize = MAX_IMAGE_BYTES;

/// Maximum comment text length in characters.
pub const MAX_COMMENT_TEXT: usize = 1000;

/// Maximum display name length in characters.
pub const MAX_NAME: usize = 50;

/// Maximum bio length in characters.
pub const MAX_BIO: usize = 250;

/// Minimum password length in characters.
pub const MIN_PASSWORD: usize = 6;

/// Number of posts returned by the main feed.
pub const FEED_LIMIT: usize = 50;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier for a registered user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// Identifier for a post.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct PostId(pub u64);

/// Identifier for a comment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct CommentId(pub u64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// TESTS
// =============================================================================
