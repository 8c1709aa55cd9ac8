//! Shared fixtures for the Share API integration tests

#![allow(dead_code)]

use async_graphql::{Request, Variables};
use chrono::Duration;
use crypto_core::{verify_token, Claims};
use serde_json::{json, Value};
use share_api::config::GraphQLConfig;
use share_api::db::MemoryStore;
use share_api::schema::{build_schema, AppSchema, AuthSettings, CurrentUser};
use std::sync::Arc;

pub const SECRET: &str = "integration-secret";

pub fn auth_settings() -> AuthSettings {
    AuthSettings {
        secret: SECRET.to_string(),
        token_ttl: Duration::hours(1),
    }
}

pub fn test_schema() -> AppSchema {
    build_schema(
        Arc::new(MemoryStore::new()),
        auth_settings(),
        &GraphQLConfig::default(),
    )
}

/// Execute `query` and return `(data, errors)` as JSON
pub async fn execute(
    schema: &AppSchema,
    query: &str,
    variables: Value,
    user: Option<Claims>,
) -> (Value, Vec<Value>) {
    let request = Request::new(query)
        .variables(Variables::from_json(variables))
        .data(CurrentUser(user));
    let response = schema.execute(request).await;

    let errors = response
        .errors
        .iter()
        .map(|e| serde_json::to_value(e).unwrap())
        .collect();
    (response.data.into_json().unwrap(), errors)
}

/// Execute and panic on any GraphQL error
pub async fn execute_ok(schema: &AppSchema, query: &str, variables: Value) -> Value {
    let (data, errors) = execute(schema, query, variables, None).await;
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    data
}

pub const SIGNUP: &str = r#"
    mutation($username: String!, $email: String!, $password: String!) {
        signupUser(username: $username, email: $email, password: $password) { token }
    }
"#;

pub const SIGNIN: &str = r#"
    mutation($username: String!, $password: String!) {
        signinUser(username: $username, password: $password) { token }
    }
"#;

pub const CURRENT_USER: &str = r#"
    query {
        getCurrentUser { _id username email favorites { _id title likes } }
    }
"#;

pub const ADD_POST: &str = r#"
    mutation($title: String!, $imageUrl: String!, $categories: [String!]!, $description: String!, $creatorId: ID!) {
        addPost(title: $title, imageUrl: $imageUrl, categories: $categories, description: $description, creatorId: $creatorId) {
            _id title likes createdBy { username }
        }
    }
"#;

/// Sign up `username` and return its decoded claims
pub async fn signup(schema: &AppSchema, username: &str) -> Claims {
    let data = execute_ok(
        schema,
        SIGNUP,
        json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "hunter2",
        }),
    )
    .await;

    let token = data["signupUser"]["token"].as_str().unwrap();
    verify_token(token, SECRET).unwrap()
}

/// Id of the signed-in user
pub async fn current_user_id(schema: &AppSchema, claims: &Claims) -> String {
    let (data, errors) = execute(schema, CURRENT_USER, json!({}), Some(claims.clone())).await;
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    data["getCurrentUser"]["_id"].as_str().unwrap().to_string()
}

/// Add a post titled `title` and return its id
pub async fn add_post(schema: &AppSchema, creator_id: &str, title: &str) -> String {
    let data = execute_ok(
        schema,
        ADD_POST,
        json!({
            "title": title,
            "imageUrl": "https://example.com/image.png",
            "categories": ["Art"],
            "description": format!("About {title}"),
            "creatorId": creator_id,
        }),
    )
    .await;

    data["addPost"]["_id"].as_str().unwrap().to_string()
}
