//! redb-backed store.
//!
//! One table per record type plus a meta table for id counters and the
//! server secret. Rows are postcard-encoded. Every write runs in a
//! single ACID transaction; readers use MVCC snapshots, so population
//! reads never block writers.

use super::{
    comment_order, feed_order, NewComment, NewPost, NewUser, PostPatch, SocialStore, StoreCounts,
};
use crate::error::CoreError;
use crate::model::{Comment, Post, User};
use crate::{CommentId, PostId, UserId};
use redb::{Database, ReadableDatabase, ReadableTable, Table, TableDefinition};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");
const USERS_BY_EMAIL: TableDefinition<&str, u64> = TableDefinition::new("users_by_email");
const POSTS: TableDefinition<u64, &[u8]> = TableDefinition::new("posts");
const COMMENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("comments");
const META: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");

const KEY_SECRET: &str = "secret";
const KEY_NEXT_USER: &str = "next_user_id";
const KEY_NEXT_POST: &str = "next_post_id";
const KEY_NEXT_COMMENT: &str = "next_comment_id";

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CoreError> {
    Ok(postcard::to_allocvec(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CoreError> {
    Ok(postcard::from_bytes(bytes)?)
}

/// Allocate the next id for a record type. Counters start at 1.
fn next_id(
    meta: &mut Table<'_, &'static str, &'static [u8]>,
    key: &'static str,
) -> Result<u64, CoreError> {
    let current = match meta.get(key)? {
        Some(guard) => u64::from_le_bytes(
            guard
                .value()
                .try_into()
                .map_err(|_| CoreError::NotFound("id counter"))?,
        ),
        None => 1,
    };
    meta.insert(key, current.saturating_add(1).to_le_bytes().as_slice())?;
    Ok(current)
}

/// redb implementation of [`SocialStore`].
#[derive(Debug)]
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Create (or re-provision) a database at `path` with the given
    /// server secret. All tables are created up front so read paths
    /// never race table creation.
    pub fn create(path: &Path, secret: [u8; 32]) -> Result<Self, CoreError> {
        let db = Database::create(path)?;
        let txn = db.begin_write()?;
        {
            let _ = txn.open_table(USERS)?;
            let _ = txn.open_table(USERS_BY_EMAIL)?;
            let _ = txn.open_table(POSTS)?;
            let _ = txn.open_table(COMMENTS)?;
            let mut meta = txn.open_table(META)?;
            meta.insert(KEY_SECRET, secret.as_slice())?;
        }
        txn.commit()?;
        Ok(Self { db })
    }

    /// Open an existing database.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let db = Database::open(path)?;
        Ok(Self { db })
    }

    fn load_user(
        table: &impl ReadableTable<u64, &'static [u8]>,
        id: UserId,
    ) -> Result<User, CoreError> {
        let guard = table.get(id.0)?.ok_or(CoreError::NotFound("user"))?;
        decode(guard.value())
    }

    fn load_post(
        table: &impl ReadableTable<u64, &'static [u8]>,
        id: PostId,
    ) -> Result<Post, CoreError> {
        let guard = table.get(id.0)?.ok_or(CoreError::NotFound("post"))?;
        decode(guard.value())
    }

    fn collect_posts(
        table: &impl ReadableTable<u64, &'static [u8]>,
        mut keep: impl FnMut(&Post) -> bool,
    ) -> Result<Vec<Post>, CoreError> {
        let mut posts = Vec::new();
        for row in table.iter()? {
            let (_, value) = row?;
            let post: Post = decode(value.value())?;
            if keep(&post) {
                posts.push(post);
            }
        }
        Ok(posts)
    }
}

impl SocialStore for RedbStore {
    fn create_user(&self, new: NewUser) -> Result<User, CoreError> {
        let txn = self.db.begin_write()?;
        let user = {
            let mut users = txn.open_table(USERS)?;
            let mut by_email = txn.open_table(USERS_BY_EMAIL)?;
            let mut meta = txn.open_table(META)?;

            if by_email.get(new.email.as_str())?.is_some() {
                return Err(CoreError::DuplicateEmail);
            }

            let id = next_id(&mut meta, KEY_NEXT_USER)?;
            let user = User {
                id: UserId(id),
                name: new.name,
                email: new.email,
                password: new.password,
                bio: new.bio,
                profile_picture: None,
                created_at: new.created_at,
            };
            let bytes = encode(&user)?;
            users.insert(id, bytes.as_slice())?;
            by_email.insert(user.email.as_str(), id)?;
            user
        };
        txn.commit()?;
        Ok(user)
    }

    fn user(&self, id: UserId) -> Result<User, CoreError> {
        let txn = self.db.begin_read()?;
        let users = txn.open_table(USERS)?;
        Self::load_user(&users, id)
    }

    fn user_by_email(&self, email: &str) -> Result<Option<User>, CoreError> {
        let txn = self.db.begin_read()?;
        let by_email = txn.open_table(USERS_BY_EMAIL)?;
        let Some(id) = by_email.get(email)?.map(|guard| guard.value()) else {
            return Ok(None);
        };
        let users = txn.open_table(USERS)?;
        Self::load_user(&users, UserId(id)).map(Some)
    }

    fn set_profile_picture(&self, id: UserId, data_url: String) -> Result<User, CoreError> {
        let txn = self.db.begin_write()?;
        let user = {
            let mut users = txn.open_table(USERS)?;
            let mut user = {
                let guard = users.get(id.0)?.ok_or(CoreError::NotFound("user"))?;
                decode::<User>(guard.value())?
            };
            user.profile_picture = Some(data_url);
            let bytes = encode(&user)?;
            users.insert(id.0, bytes.as_slice())?;
            user
        };
        txn.commit()?;
        Ok(user)
    }

    fn create_post(&self, new: NewPost) -> Result<Post, CoreError> {
        let txn = self.db.begin_write()?;
        let post = {
            let users = txn.open_table(USERS)?;
            if users.get(new.author.0)?.is_none() {
                return Err(CoreError::NotFound("user"));
            }
            drop(users);

            let mut posts = txn.open_table(POSTS)?;
            let mut meta = txn.open_table(META)?;
            let id = next_id(&mut meta, KEY_NEXT_POST)?;

            let post = Post {
                id: PostId(id),
                author: new.author,
                text: new.text,
                images: new.images,
                likes: BTreeSet::new(),
                created_at: new.created_at,
                updated_at: new.created_at,
            };
            let bytes = encode(&post)?;
            posts.insert(id, bytes.as_slice())?;
            post
        };
        txn.commit()?;
        Ok(post)
    }

    fn post(&self, id: PostId) -> Result<Post, CoreError> {
        let txn = self.db.begin_read()?;
        let posts = txn.open_table(POSTS)?;
        Self::load_post(&posts, id)
    }

    fn feed(&self, limit: usize) -> Result<Vec<Post>, CoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(POSTS)?;
        let mut posts = Self::collect_posts(&table, |_| true)?;
        posts.sort_by(feed_order);
        posts.truncate(limit);
        Ok(posts)
    }

    fn posts_by_author(&self, author: UserId) -> Result<Vec<Post>, CoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(POSTS)?;
        let mut posts = Self::collect_posts(&table, |p| p.author == author)?;
        posts.sort_by(feed_order);
        Ok(posts)
    }

    fn update_post(
        &self,
        id: PostId,
        caller: UserId,
        patch: PostPatch,
    ) -> Result<Post, CoreError> {
        let txn = self.db.begin_write()?;
        let post = {
            let mut posts = txn.open_table(POSTS)?;
            let mut post = {
                let guard = posts.get(id.0)?.ok_or(CoreError::NotFound("post"))?;
                decode::<Post>(guard.value())?
            };
            if post.author != caller {
                return Err(CoreError::Forbidden);
            }

            post.text = patch.text;
            post.images = patch.images;
            post.updated_at = patch.updated_at;

            let bytes = encode(&post)?;
            posts.insert(id.0, bytes.as_slice())?;
            post
        };
        txn.commit()?;
        Ok(post)
    }

    fn delete_post(&self, id: PostId, caller: UserId) -> Result<(), CoreError> {
        let txn = self.db.begin_write()?;
        {
            let mut posts = txn.open_table(POSTS)?;
            let post = {
                let guard = posts.get(id.0)?.ok_or(CoreError::NotFound("post"))?;
                decode::<Post>(guard.value())?
            };
            if post.author != caller {
                return Err(CoreError::Forbidden);
            }
            posts.remove(id.0)?;

            // Cascade: a comment without its post is unreachable.
            let mut comments = txn.open_table(COMMENTS)?;
            let mut doomed = Vec::new();
            for row in comments.iter()? {
                let (key, value) = row?;
                let comment: Comment = decode(value.value())?;
                if comment.post == id {
                    doomed.push(key.value());
                }
            }
            for key in doomed {
                comments.remove(key)?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    fn toggle_like(&self, id: PostId, caller: UserId) -> Result<Post, CoreError> {
        let txn = self.db.begin_write()?;
        let post = {
            let mut posts = txn.open_table(POSTS)?;
            let mut post = {
                let guard = posts.get(id.0)?.ok_or(CoreError::NotFound("post"))?;
                decode::<Post>(guard.value())?
            };
            post.toggle_like(caller);
            let bytes = encode(&post)?;
            posts.insert(id.0, bytes.as_slice())?;
            post
        };
        txn.commit()?;
        Ok(post)
    }

    fn create_comment(&self, new: NewComment) -> Result<Comment, CoreError> {
        let txn = self.db.begin_write()?;
        let comment = {
            let posts = txn.open_table(POSTS)?;
            if posts.get(new.post.0)?.is_none() {
                return Err(CoreError::NotFound("post"));
            }
            drop(posts);
            let users = txn.open_table(USERS)?;
            if users.get(new.author.0)?.is_none() {
                return Err(CoreError::NotFound("user"));
            }
            drop(users);

            let mut comments = txn.open_table(COMMENTS)?;
            let mut meta = txn.open_table(META)?;
            let id = next_id(&mut meta, KEY_NEXT_COMMENT)?;

            let comment = Comment {
                id: CommentId(id),
                post: new.post,
                author: new.author,
                text: new.text,
                created_at: new.created_at,
            };
            let bytes = encode(&comment)?;
            comments.insert(id, bytes.as_slice())?;
            comment
        };
        txn.commit()?;
        Ok(comment)
    }

    fn comments_for_post(&self, post: PostId) -> Result<Vec<Comment>, CoreError> {
        let txn = self.db.begin_read()?;
        let posts = txn.open_table(POSTS)?;
        if posts.get(post.0)?.is_none() {
            return Err(CoreError::NotFound("post"));
        }

        let table = txn.open_table(COMMENTS)?;
        let mut comments = Vec::new();
        for row in table.iter()? {
            let (_, value) = row?;
            let comment: Comment = decode(value.value())?;
            if comment.post == post {
                comments.push(comment);
            }
        }
        comments.sort_by(comment_order);
        Ok(comments)
    }

    fn counts(&self) -> Result<StoreCounts, CoreError> {
        let txn = self.db.begin_read()?;
        let users = txn.open_table(USERS)?.iter()?.count();
        let posts = txn.open_table(POSTS)?.iter()?.count();
        let comments = txn.open_table(COMMENTS)?.iter()?.count();
        Ok(StoreCounts {
            users,
            posts,
            comments,
        })
    }

    fn server_secret(&self) -> Result<[u8; 32], CoreError> {
        let txn = self.db.begin_read()?;
        let meta = txn.open_table(META)?;
        let guard = meta
            .get(KEY_SECRET)?
            .ok_or(CoreError::NotFound("server secret"))?;
        guard
            .value()
            .try_into()
            .map_err(|_| CoreError::NotFound("server secret"))
    }
}

// =============================================================================
// TESTS
// =============================================================================
