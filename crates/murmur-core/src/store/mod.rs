//! # Store Module
//!
//! The `SocialStore` trait and its two implementations:
//!
//! - [`MemStore`]: in-memory `BTreeMap` store, used by tests and for
//!   ephemeral serving.
//! - [`RedbStore`]: redb-backed store with ACID transactions and
//!   postcard row encoding.
//!
//! Ownership checks live here: updates and deletions take the caller's
//! id and fail with `Forbidden` when it does not match the author. Ids
//! are allocated monotonically per record type and never reused.

mod mem;
mod redb_store;

pub use mem::MemStore;
pub use redb_store::RedbStore;

use crate::error::CoreError;
use crate::model::{Comment, CommentView, Post, PostView, User};
use crate::auth::PasswordRecord;
use crate::{PostId, UserId};

// =============================================================================
// WRITE INPUTS
// =============================================================================

/// Input for creating a user. Fields are assumed validated/normalized.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    /// Lowercase; the store enforces uniqueness.
    pub email: String,
    pub password: PasswordRecord,
    pub bio: String,
    pub created_at: u64,
}

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author: UserId,
    pub text: String,
    pub images: Vec<String>,
    pub created_at: u64,
}

/// Input for creating a comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post: PostId,
    pub author: UserId,
    pub text: String,
    pub created_at: u64,
}

/// Replacement content for an owner's post edit.
#[derive(Debug, Clone)]
pub struct PostPatch {
    pub text: String,
    pub images: Vec<String>,
    pub updated_at: u64,
}

/// Record counts, for the status command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
    pub users: usize,
    pub posts: usize,
    pub comments: usize,
}

// =============================================================================
// SOCIALSTORE TRAIT
// =============================================================================

/// Persistence operations for the social domain.
///
/// Object-safe so the app layer can hold `Arc<dyn SocialStore>`; all
/// methods take `&self` and implementations handle their own interior
/// locking or transactions.
pub trait SocialStore: Send + Sync {
    // --- users ---

    /// Create a user. Fails with `DuplicateEmail` if the email is taken.
    fn create_user(&self, new: NewUser) -> Result<User, CoreError>;

    /// Fetch a user by id.
    fn user(&self, id: UserId) -> Result<User, CoreError>;

    /// Look up a user by (lowercase) email.
    fn user_by_email(&self, email: &str) -> Result<Option<User>, CoreError>;

    /// Replace a user's profile picture with the given data URL.
    fn set_profile_picture(&self, id: UserId, data_url: String) -> Result<User, CoreError>;

    // --- posts ---

    fn create_post(&self, new: NewPost) -> Result<Post, CoreError>;

    fn post(&self, id: PostId) -> Result<Post, CoreError>;

    /// The main feed: up to `limit` posts, newest first (ties broken by
    /// descending id).
    fn feed(&self, limit: usize) -> Result<Vec<Post>, CoreError>;

    /// All posts by one author, newest first.
    fn posts_by_author(&self, author: UserId) -> Result<Vec<Post>, CoreError>;

    /// Replace a post's content. `caller` must be the author.
    fn update_post(
        &self,
        id: PostId,
        caller: UserId,
        patch: PostPatch,
    ) -> Result<Post, CoreError>;

    /// Delete a post and its comments. `caller` must be the author.
    fn delete_post(&self, id: PostId, caller: UserId) -> Result<(), CoreError>;

    /// Flip the caller's like on a post and return the updated post.
    fn toggle_like(&self, id: PostId, caller: UserId) -> Result<Post, CoreError>;

    // --- comments ---

    fn create_comment(&self, new: NewComment) -> Result<Comment, CoreError>;

    /// Comments on a post, oldest first (ties broken by ascending id).
    /// Fails with `NotFound` if the post does not exist.
    fn comments_for_post(&self, post: PostId) -> Result<Vec<Comment>, CoreError>;

    // --- misc ---

    fn counts(&self) -> Result<StoreCounts, CoreError>;

    /// The 32-byte server secret used for token signing.
    fn server_secret(&self) -> Result<[u8; 32], CoreError>;
}

// =============================================================================
// POPULATION HELPERS
// =============================================================================

/// Attach the author record to a post (the `populate` hook analog).
pub fn populate_post(store: &dyn SocialStore, post: Post) -> Result<PostView, CoreError> {
    let author = store.user(post.author)?;
    Ok(PostView::populate(post, &author))
}

/// Populate a batch of posts, preserving order.
pub fn populate_posts(
    store: &dyn SocialStore,
    posts: Vec<Post>,
) -> Result<Vec<PostView>, CoreError> {
    posts
        .into_iter()
        .map(|post| populate_post(store, post))
        .collect()
}

/// Attach the author record to a comment.
pub fn populate_comment(
    store: &dyn SocialStore,
    comment: Comment,
) -> Result<CommentView, CoreError> {
    let author = store.user(comment.author)?;
    Ok(CommentView::populate(comment, &author))
}

/// Populate a batch of comments, preserving order.
pub fn populate_comments(
    store: &dyn SocialStore,
    comments: Vec<Comment>,
) -> Result<Vec<CommentView>, CoreError> {
    comments
        .into_iter()
        .map(|comment| populate_comment(store, comment))
        .collect()
}

/// Feed ordering key: newest first, descending id as tiebreak.
pub(crate) fn feed_order(a: &Post, b: &Post) -> std::cmp::Ordering {
    (b.created_at, b.id).cmp(&(a.created_at, a.id))
}

/// Comment ordering key: oldest first, ascending id as tiebreak.
pub(crate) fn comment_order(a: &Comment, b: &Comment) -> std::cmp::Ordering {
    (a.created_at, a.id).cmp(&(b.created_at, b.id))
}
