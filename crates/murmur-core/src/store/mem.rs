//! In-memory store.
//!
//! `BTreeMap` everywhere for deterministic iteration. Interior locking
//! via a single `RwLock`; a poisoned lock surfaces as `CoreError::Poisoned`
//! rather than panicking.

use super::{
    comment_order, feed_order, NewComment, NewPost, NewUser, PostPatch, SocialStore, StoreCounts,
};
use crate::error::CoreError;
use crate::model::{Comment, Post, User};
use crate::{CommentId, PostId, UserId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    email_index: BTreeMap<String, UserId>,
    posts: BTreeMap<PostId, Post>,
    comments: BTreeMap<CommentId, Comment>,
    next_user: u64,
    next_post: u64,
    next_comment: u64,
}

/// In-memory implementation of [`SocialStore`].
#[derive(Debug)]
pub struct MemStore {
    inner: RwLock<Tables>,
    secret: [u8; 32],
}

impl MemStore {
    /// Create an empty store with the given server secret.
    #[must_use]
    pub fn new(secret: [u8; 32]) -> Self {
        Self {
            inner: RwLock::new(Tables {
                next_user: 1,
                next_post: 1,
                next_comment: 1,
                ..Tables::default()
            }),
            secret,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, CoreError> {
        self.inner.read().map_err(|_| CoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, CoreError> {
        self.inner.write().map_err(|_| CoreError::Poisoned)
    }
}

impl SocialStore for MemStore {
    fn create_user(&self, new: NewUser) -> Result<User, CoreError> {
        let mut tables = self.write()?;
        if tables.email_index.contains_key(&new.email) {
            return Err(CoreError::DuplicateEmail);
        }

        let id = UserId(tables.next_user);
        tables.next_user = tables.next_user.saturating_add(1);

        let user = User {
            id,
            name: new.name,
            email: new.email,
            password: new.password,
            bio: new.bio,
            profile_picture: None,
            created_at: new.created_at,
        };
        tables.email_index.insert(user.email.clone(), id);
        tables.users.insert(id, user.clone());

        Ok(user)
    }

    fn user(&self, id: UserId) -> Result<User, CoreError> {
        self.read()?
            .users
            .get(&id)
            .cloned()
            .ok_or(CoreError::NotFound("user"))
    }

    fn user_by_email(&self, email: &str) -> Result<Option<User>, CoreError> {
        let tables = self.read()?;
        Ok(tables
            .email_index
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    fn set_profile_picture(&self, id: UserId, data_url: String) -> Result<User, CoreError> {
        let mut tables = self.write()?;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or(CoreError::NotFound("user"))?;
        user.profile_picture = Some(data_url);
        Ok(user.clone())
    }

    fn create_post(&self, new: NewPost) -> Result<Post, CoreError> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&new.author) {
            return Err(CoreError::NotFound("user"));
        }

        let id = PostId(tables.next_post);
        tables.next_post = tables.next_post.saturating_add(1);

        let post = Post {
            id,
            author: new.author,
            text: new.text,
            images: new.images,
            likes: BTreeSet::new(),
            created_at: new.created_at,
            updated_at: new.created_at,
        };
        tables.posts.insert(id, post.clone());

        Ok(post)
    }

    fn post(&self, id: PostId) -> Result<Post, CoreError> {
        self.read()?
            .posts
            .get(&id)
            .cloned()
            .ok_or(CoreError::NotFound("post"))
    }

    fn feed(&self, limit: usize) -> Result<Vec<Post>, CoreError> {
        let tables = self.read()?;
        let mut posts: Vec<Post> = tables.posts.values().cloned().collect();
        posts.sort_by(feed_order);
        posts.truncate(limit);
        Ok(posts)
    }

    fn posts_by_author(&self, author: UserId) -> Result<Vec<Post>, CoreError> {
        let tables = self.read()?;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| p.author == author)
            .cloned()
            .collect();
        posts.sort_by(feed_order);
        Ok(posts)
    }

    fn update_post(
        &self,
        id: PostId,
        caller: UserId,
        patch: PostPatch,
    ) -> Result<Post, CoreError> {
        let mut tables = self.write()?;
        let post = tables
            .posts
            .get_mut(&id)
            .ok_or(CoreError::NotFound("post"))?;
        if post.author != caller {
            return Err(CoreError::Forbidden);
        }

        post.text = patch.text;
        post.images = patch.images;
        post.updated_at = patch.updated_at;

        Ok(post.clone())
    }

    fn delete_post(&self, id: PostId, caller: UserId) -> Result<(), CoreError> {
        let mut tables = self.write()?;
        let post = tables.posts.get(&id).ok_or(CoreError::NotFound("post"))?;
        if post.author != caller {
            return Err(CoreError::Forbidden);
        }

        tables.posts.remove(&id);
        tables.comments.retain(|_, c| c.post != id);

        Ok(())
    }

    fn toggle_like(&self, id: PostId, caller: UserId) -> Result<Post, CoreError> {
        let mut tables = self.write()?;
        let post = tables
            .posts
            .get_mut(&id)
            .ok_or(CoreError::NotFound("post"))?;
        post.toggle_like(caller);
        Ok(post.clone())
    }

    fn create_comment(&self, new: NewComment) -> Result<Comment, CoreError> {
        let mut tables = self.write()?;
        if !tables.posts.contains_key(&new.post) {
            return Err(CoreError::NotFound("post"));
        }
        if !tables.users.contains_key(&new.author) {
            return Err(CoreError::NotFound("user"));
        }

        let id = CommentId(tables.next_comment);
        tables.next_comment = tables.next_comment.saturating_add(1);

        let comment = Comment {
            id,
            post: new.post,
            author: new.author,
            text: new.text,
            created_at: new.created_at,
        };
        tables.comments.insert(id, comment.clone());

        Ok(comment)
    }

    fn comments_for_post(&self, post: PostId) -> Result<Vec<Comment>, CoreError> {
        let tables = self.read()?;
        if !tables.posts.contains_key(&post) {
            return Err(CoreError::NotFound("post"));
        }

        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post == post)
            .cloned()
            .collect();
        comments.sort_by(comment_order);
        Ok(comments)
    }

    fn counts(&self) -> Result<StoreCounts, CoreError> {
        let tables = self.read()?;
        Ok(StoreCounts {
            users: tables.users.len(),
            posts: tables.posts.len(),
            comments: tables.comments.len(),
        })
    }

    fn server_secret(&self) -> Result<[u8; 32], CoreError> {
        Ok(self.secret)
    }
}

// =============================================================================
// TESTS
// =============================================================================
