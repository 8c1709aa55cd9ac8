//! PostgreSQL-backed store
//!
//! Users and posts are one row each; embedded messages live in a JSONB
//! array and favorites in a UUID array, so every mutation stays a
//! single-row `UPDATE ... RETURNING`.

use super::{
    MessageRecord, NewMessage, NewPost, NewUser, PostRecord, Store, StoreError, StoreResult,
    UserRecord,
};
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> StoreResult<()> {
        debug!("Running database migrations");
        MIGRATOR.run(&self.pool).await?;
        info!("Database migrations completed successfully");
        Ok(())
    }
}

fn map_unique_violation(err: sqlx::Error, key: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Duplicate(key.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<UserRecord>> {
        let users = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        let username = user.username.clone();
        sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, username, email, password)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &username))
    }

    async fn list_posts(&self, offset: i64, limit: Option<i64>) -> StoreResult<Vec<PostRecord>> {
        // LIMIT NULL is LIMIT ALL
        let posts = sqlx::query_as::<_, PostRecord>(
            r#"
            SELECT * FROM posts
            ORDER BY created_date DESC
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn count_posts(&self) -> StoreResult<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<PostRecord>> {
        let post = sqlx::query_as::<_, PostRecord>("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    async fn find_posts_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<PostRecord>> {
        let posts = sqlx::query_as::<_, PostRecord>("SELECT * FROM posts WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(posts)
    }

    async fn insert_post(&self, post: NewPost) -> StoreResult<PostRecord> {
        let record = sqlx::query_as::<_, PostRecord>(
            r#"
            INSERT INTO posts (id, title, image_url, categories, description, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post.title)
        .bind(post.image_url)
        .bind(post.categories)
        .bind(post.description)
        .bind(post.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn prepend_message(
        &self,
        post_id: Uuid,
        message: NewMessage,
    ) -> StoreResult<Option<MessageRecord>> {
        let record = message.into_record();

        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE posts
            SET messages = jsonb_build_array($2::jsonb) || messages
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(post_id)
        .bind(Json(&record))
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated.map(|_| record))
    }

    async fn add_likes(&self, post_id: Uuid, delta: i32) -> StoreResult<Option<i32>> {
        let likes = sqlx::query_scalar::<_, i32>(
            "UPDATE posts SET likes = likes + $2 WHERE id = $1 RETURNING likes",
        )
        .bind(post_id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        Ok(likes)
    }

    async fn add_favorite(&self, username: &str, post_id: Uuid) -> StoreResult<Option<Vec<Uuid>>> {
        let favorites = sqlx::query_scalar::<_, Vec<Uuid>>(
            r#"
            UPDATE users
            SET favorites = CASE
                WHEN $2 = ANY(favorites) THEN favorites
                ELSE array_append(favorites, $2)
            END
            WHERE username = $1
            RETURNING favorites
            "#,
        )
        .bind(username)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(favorites)
    }

    async fn remove_favorite(
        &self,
        username: &str,
        post_id: Uuid,
    ) -> StoreResult<Option<Vec<Uuid>>> {
        let favorites = sqlx::query_scalar::<_, Vec<Uuid>>(
            r#"
            UPDATE users
            SET favorites = array_remove(favorites, $2)
            WHERE username = $1
            RETURNING favorites
            "#,
        )
        .bind(username)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(favorites)
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
