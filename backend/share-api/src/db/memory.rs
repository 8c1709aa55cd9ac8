//! In-process store
//!
//! Backs local development (`STORE_BACKEND=memory`) and the test suites.
//! A single lock keeps each operation atomic, matching the per-record
//! atomicity of the database backend.

use super::{
    MessageRecord, NewMessage, NewPost, NewUser, PostRecord, Store, StoreError, StoreResult,
    UserRecord,
};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

#[derive(Default)]
struct Collections {
    users: Vec<UserRecord>,
    /// Insertion order
    posts: Vec<PostRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<UserRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate(user.username));
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password: user.password_hash,
            join_date: Utc::now(),
            favorites: Vec::new(),
        };
        inner.users.push(record.clone());
        Ok(record)
    }

    async fn list_posts(&self, offset: i64, limit: Option<i64>) -> StoreResult<Vec<PostRecord>> {
        let inner = self.inner.read().await;

        // Newest insertions first, then a stable sort keeps that order on ties
        let mut posts: Vec<&PostRecord> = inner.posts.iter().rev().collect();
        posts.sort_by(|a, b| b.created_date.cmp(&a.created_date));

        let skip = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let take = match limit {
            Some(limit) => usize::try_from(limit.max(0)).unwrap_or(usize::MAX),
            None => usize::MAX,
        };

        Ok(posts.into_iter().skip(skip).take(take).cloned().collect())
    }

    async fn count_posts(&self) -> StoreResult<i64> {
        let inner = self.inner.read().await;
        Ok(inner.posts.len() as i64)
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<PostRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn find_posts_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<PostRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .posts
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn insert_post(&self, post: NewPost) -> StoreResult<PostRecord> {
        let mut inner = self.inner.write().await;
        let record = PostRecord {
            id: Uuid::new_v4(),
            title: post.title,
            image_url: post.image_url,
            categories: post.categories,
            description: post.description,
            created_by: post.created_by,
            created_date: Utc::now(),
            likes: 0,
            messages: Vec::new(),
        };
        inner.posts.push(record.clone());
        Ok(record)
    }

    async fn prepend_message(
        &self,
        post_id: Uuid,
        message: NewMessage,
    ) -> StoreResult<Option<MessageRecord>> {
        let mut inner = self.inner.write().await;
        let Some(post) = inner.posts.iter_mut().find(|p| p.id == post_id) else {
            return Ok(None);
        };

        let record = message.into_record();
        post.messages.insert(0, record.clone());
        Ok(Some(record))
    }

    async fn add_likes(&self, post_id: Uuid, delta: i32) -> StoreResult<Option<i32>> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .map(|post| {
                post.likes += delta;
                post.likes
            }))
    }

    async fn add_favorite(&self, username: &str, post_id: Uuid) -> StoreResult<Option<Vec<Uuid>>> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .users
            .iter_mut()
            .find(|u| u.username == username)
            .map(|user| {
                if !user.favorites.contains(&post_id) {
                    user.favorites.push(post_id);
                }
                user.favorites.clone()
            }))
    }

    async fn remove_favorite(
        &self,
        username: &str,
        post_id: Uuid,
    ) -> StoreResult<Option<Vec<Uuid>>> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .users
            .iter_mut()
            .find(|u| u.username == username)
            .map(|user| {
                user.favorites.retain(|id| *id != post_id);
                user.favorites.clone()
            }))
    }
}
