//! Persistence layer
//!
//! Resolvers talk to a [`Store`]; each mutation is a single atomic update of
//! one user or one post. Nothing spans two records in a transaction.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Store handle shared by the schema and its loaders
pub type SharedStore = Arc<dyn Store>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string
    pub password: String,
    pub join_date: DateTime<Utc>,
    /// Ordered, duplicate-free
    pub favorites: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: Uuid,
    pub message_body: String,
    pub message_date: DateTime<Utc>,
    pub message_user: Uuid,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRecord {
    pub id: Uuid,
    pub title: String,
    pub image_url: String,
    pub categories: Vec<String>,
    pub description: String,
    pub created_by: Uuid,
    pub created_date: DateTime<Utc>,
    pub likes: i32,
    /// Newest first
    #[sqlx(json)]
    pub messages: Vec<MessageRecord>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub image_url: String,
    pub categories: Vec<String>,
    pub description: String,
    pub created_by: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub message_body: String,
    pub message_user: Uuid,
}

impl NewMessage {
    /// Stamp the message with an id and the current time
    pub fn into_record(self) -> MessageRecord {
        MessageRecord {
            id: Uuid::new_v4(),
            message_body: self.message_body,
            message_date: Utc::now(),
            message_user: self.message_user,
        }
    }
}

/// Operations the resolvers need from the database.
/// Implemented by [`PgStore`] (PostgreSQL) and [`MemoryStore`] (in-process).
#[async_trait]
pub trait Store: Send + Sync {
    /// Find a user by unique username
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>>;

    /// Batch lookup; unknown ids are silently skipped
    async fn find_users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<UserRecord>>;

    /// Insert a user; `StoreError::Duplicate` if the username is taken
    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRecord>;

    /// Posts ordered by creation date, newest first.
    /// `limit = None` returns everything after `offset`.
    async fn list_posts(&self, offset: i64, limit: Option<i64>) -> StoreResult<Vec<PostRecord>>;

    async fn count_posts(&self) -> StoreResult<i64>;

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<PostRecord>>;

    /// Batch lookup; unknown ids are silently skipped
    async fn find_posts_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<PostRecord>>;

    async fn insert_post(&self, post: NewPost) -> StoreResult<PostRecord>;

    /// Put `message` at the head of the post's message list.
    /// Returns `None` if the post does not exist.
    async fn prepend_message(
        &self,
        post_id: Uuid,
        message: NewMessage,
    ) -> StoreResult<Option<MessageRecord>>;

    /// Add `delta` to the like counter (unguarded, may go negative).
    /// Returns the new value, or `None` if the post does not exist.
    async fn add_likes(&self, post_id: Uuid, delta: i32) -> StoreResult<Option<i32>>;

    /// Set-add `post_id` to the user's favorites.
    /// Returns the updated favorites, or `None` if the user does not exist.
    async fn add_favorite(&self, username: &str, post_id: Uuid) -> StoreResult<Option<Vec<Uuid>>>;

    /// Remove `post_id` from the user's favorites.
    /// Returns the updated favorites, or `None` if the user does not exist.
    async fn remove_favorite(
        &self,
        username: &str,
        post_id: Uuid,
    ) -> StoreResult<Option<Vec<Uuid>>>;

    /// Health check (optional)
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
