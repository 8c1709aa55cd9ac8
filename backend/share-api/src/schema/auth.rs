//! Authentication schema and resolvers

use async_graphql::{Context, ErrorExtensions, Object, Result as GraphQLResult, SimpleObject};
use crypto_core::{hash_password, issue_token, verify_password};
use tracing::{info, warn};

use super::{store, AuthSettings};
use crate::db::{NewUser, StoreError, UserRecord};
use crate::error::{ApiError, ApiResult};

/// Session token handed out at sign-in and sign-up
#[derive(SimpleObject, Clone, Debug)]
pub struct Token {
    pub token: String,
}

#[derive(Default)]
pub struct AuthQuery;

#[Object]
impl AuthQuery {
    /// "ok" once the store answers
    async fn health(&self, ctx: &Context<'_>) -> GraphQLResult<&str> {
        store(ctx)
            .map_err(|e| e.extend())?
            .health_check()
            .await
            .map_err(|e| ApiError::from(e).extend())?;
        Ok("ok")
    }
}

#[derive(Default)]
pub struct AuthMutation;

#[Object]
impl AuthMutation {
    async fn signin_user(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
    ) -> GraphQLResult<Token> {
        signin_user(ctx, &username, &password)
            .await
            .map_err(|e| e.extend())
    }

    async fn signup_user(
        &self,
        ctx: &Context<'_>,
        username: String,
        email: String,
        password: String,
    ) -> GraphQLResult<Token> {
        signup_user(ctx, username, email, &password)
            .await
            .map_err(|e| e.extend())
    }
}

fn auth_settings<'a>(ctx: &Context<'a>) -> ApiResult<&'a AuthSettings> {
    ctx.data::<AuthSettings>()
        .map_err(|_| ApiError::Internal("Auth settings not available".to_string()))
}

fn create_token(user: &UserRecord, settings: &AuthSettings) -> ApiResult<Token> {
    let token = issue_token(&user.username, &user.email, &settings.secret, settings.token_ttl)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Token { token })
}

async fn signin_user(ctx: &Context<'_>, username: &str, password: &str) -> ApiResult<Token> {
    let user = store(ctx)?
        .find_user_by_username(username)
        .await?
        .ok_or_else(|| {
            warn!(username = %username, "Sign-in for unknown user");
            ApiError::UserNotFound
        })?;

    let valid = verify_password(password, &user.password)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !valid {
        warn!(username = %username, "Sign-in with incorrect password");
        return Err(ApiError::InvalidPassword);
    }

    info!(username = %username, "User signed in");
    create_token(&user, auth_settings(ctx)?)
}

async fn signup_user(
    ctx: &Context<'_>,
    username: String,
    email: String,
    password: &str,
) -> ApiResult<Token> {
    let store = store(ctx)?;

    if store.find_user_by_username(&username).await?.is_some() {
        return Err(ApiError::UserExists);
    }

    let password_hash =
        hash_password(password).map_err(|e| ApiError::Internal(e.to_string()))?;

    // A concurrent signup can still win the race to the unique key
    let user = store
        .insert_user(NewUser {
            username,
            email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => ApiError::UserExists,
            other => ApiError::Store(other),
        })?;

    info!(username = %user.username, user_id = %user.id, "User signed up");
    create_token(&user, auth_settings(ctx)?)
}
