//! User schema and resolvers

use async_graphql::{
    dataloader::DataLoader, ComplexObject, Context, ErrorExtensions, Object,
    Result as GraphQLResult, SimpleObject, ID,
};
use uuid::Uuid;

use super::loaders::{PostLoader, UserLoader};
use super::post::Post;
use super::{current_user, store};
use crate::db::UserRecord;
use crate::error::{ApiError, ApiResult};

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct User {
    #[graphql(name = "_id")]
    pub id: ID,
    pub username: String,
    pub email: String,
    pub join_date: String,
    #[graphql(skip)]
    pub favorite_ids: Vec<Uuid>,
}

impl From<UserRecord> for User {
    fn from(user: UserRecord) -> Self {
        User {
            id: ID(user.id.to_string()),
            username: user.username,
            email: user.email,
            join_date: user.join_date.to_rfc3339(),
            favorite_ids: user.favorites,
        }
    }
}

#[ComplexObject]
impl User {
    /// Liked posts, in the order they were liked
    async fn favorites(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<Post>> {
        load_posts(ctx, &self.favorite_ids)
            .await
            .map_err(|e| e.extend())
    }
}

/// Populate a user reference; a dangling reference resolves to null
pub(crate) async fn load_user(ctx: &Context<'_>, id: Uuid) -> ApiResult<Option<User>> {
    let loader = ctx
        .data::<DataLoader<UserLoader>>()
        .map_err(|_| ApiError::Internal("User loader not available".to_string()))?;

    let user = loader
        .load_one(id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(user.map(User::from))
}

/// Populate post references, preserving `ids` order and skipping dangling ones
pub(crate) async fn load_posts(ctx: &Context<'_>, ids: &[Uuid]) -> ApiResult<Vec<Post>> {
    let loader = ctx
        .data::<DataLoader<PostLoader>>()
        .map_err(|_| ApiError::Internal("Post loader not available".to_string()))?;

    let mut found = loader
        .load_many(ids.iter().copied())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(ids
        .iter()
        .filter_map(|id| found.remove(id))
        .map(Post::from)
        .collect())
}

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// The signed-in user, or null without a valid session
    async fn get_current_user(&self, ctx: &Context<'_>) -> GraphQLResult<Option<User>> {
        let Some(claims) = current_user(ctx) else {
            return Ok(None);
        };

        let user = store(ctx)
            .map_err(|e| e.extend())?
            .find_user_by_username(&claims.username)
            .await
            .map_err(|e| ApiError::from(e).extend())?;

        Ok(user.map(User::from))
    }
}
