//! GraphQL schema
//!
//! Resolvers map each named operation onto a single [`Store`] call.
//! Reference fields (`createdBy`, `messageUser`, `favorites`) are populated
//! through DataLoaders so a page of posts costs one batch lookup.
//!
//! [`Store`]: crate::db::Store

pub mod auth;
pub mod loaders;
pub mod pagination;
pub mod post;
pub mod user;

use async_graphql::{
    dataloader::DataLoader, Context, EmptySubscription, MergedObject, Schema, ID,
};
use chrono::Duration;
use crypto_core::Claims;
use uuid::Uuid;

use crate::config::{GraphQLConfig, JwtConfig};
use crate::db::SharedStore;
use crate::error::{ApiError, ApiResult};

/// Root query object
#[derive(MergedObject, Default)]
pub struct QueryRoot(user::UserQuery, post::PostQuery, auth::AuthQuery);

/// Root mutation object
#[derive(MergedObject, Default)]
pub struct MutationRoot(post::PostMutation, auth::AuthMutation);

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Token signing settings available to the auth resolvers
#[derive(Clone)]
pub struct AuthSettings {
    pub secret: String,
    pub token_ttl: Duration,
}

impl From<&JwtConfig> for AuthSettings {
    fn from(config: &JwtConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            token_ttl: config.ttl(),
        }
    }
}

/// Per-request identity, attached by the HTTP layer.
/// `None` means the request carried no token.
#[derive(Clone, Debug, Default)]
pub struct CurrentUser(pub Option<Claims>);

/// Build the schema over `store`
pub fn build_schema(store: SharedStore, auth: AuthSettings, limits: &GraphQLConfig) -> AppSchema {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(DataLoader::new(
        loaders::UserLoader::new(store.clone()),
        tokio::task::spawn,
    ))
    .data(DataLoader::new(
        loaders::PostLoader::new(store.clone()),
        tokio::task::spawn,
    ))
    .data(store)
    .data(auth)
    .limit_depth(limits.max_depth)
    .limit_complexity(limits.max_complexity)
    .finish()
}

pub(crate) fn store<'a>(ctx: &Context<'a>) -> ApiResult<&'a SharedStore> {
    ctx.data::<SharedStore>()
        .map_err(|_| ApiError::Internal("Store not available".to_string()))
}

pub(crate) fn current_user<'a>(ctx: &Context<'a>) -> Option<&'a Claims> {
    ctx.data_opt::<CurrentUser>().and_then(|user| user.0.as_ref())
}

pub(crate) fn parse_id(id: &ID, field: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(id.as_str())
        .map_err(|_| ApiError::Validation(format!("Invalid {field}: {}", id.as_str())))
}
