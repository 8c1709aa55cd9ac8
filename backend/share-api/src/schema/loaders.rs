//! DataLoader implementations for reference population
//!
//! A page of posts resolves every `createdBy` with one batch lookup
//! instead of one query per post.

use async_graphql::dataloader::Loader;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{PostRecord, SharedStore, StoreError, UserRecord};

/// Batches user lookups (`createdBy`, `messageUser`)
pub struct UserLoader {
    store: SharedStore,
}

impl UserLoader {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl Loader<Uuid> for UserLoader {
    type Value = UserRecord;
    type Error = Arc<StoreError>;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        let users = self.store.find_users_by_ids(keys).await.map_err(Arc::new)?;
        Ok(users.into_iter().map(|user| (user.id, user)).collect())
    }
}

/// Batches post lookups (`favorites`)
pub struct PostLoader {
    store: SharedStore,
}

impl PostLoader {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl Loader<Uuid> for PostLoader {
    type Value = PostRecord;
    type Error = Arc<StoreError>;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        let posts = self.store.find_posts_by_ids(keys).await.map_err(Arc::new)?;
        Ok(posts.into_iter().map(|post| (post.id, post)).collect())
    }
}
