//! Client state container
//!
//! [`ShareStore`] owns the signed-in user, the fetched posts and the
//! request status flags. Actions dispatch GraphQL operations through a
//! [`Transport`]; getters return snapshots of the state.
//!
//! Any response carrying an `AuthenticationError` records it in
//! `auth_error` and signs the user out.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{error, info, warn};

use crate::api::{take_field, ClientError, Transport};
use crate::queries;
use crate::router::{self, Route};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub image_url: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub join_date: String,
    #[serde(default)]
    pub favorites: Vec<Post>,
}

/// Arguments of the `addPost` mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPostInput {
    pub title: String,
    pub image_url: String,
    pub categories: Vec<String>,
    pub description: String,
    pub creator_id: String,
}

impl NewPostInput {
    fn optimistic(&self, id: String) -> Post {
        Post {
            id,
            title: self.title.clone(),
            image_url: self.image_url.clone(),
            categories: self.categories.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientState {
    pub user: Option<User>,
    pub posts: Vec<Post>,
    pub loading: bool,
    pub error: Option<String>,
    pub auth_error: Option<String>,
    /// Current client-side path
    pub location: String,
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            user: None,
            posts: Vec::new(),
            loading: false,
            error: None,
            auth_error: None,
            location: "/".to_string(),
        }
    }
}

/// Persistent slot for the session token
pub trait TokenStorage: Send + Sync {
    /// Stored token; `None` when nothing was ever stored
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str);
}

/// Process-local token storage
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn get(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, token: &str) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.to_string());
    }
}

pub struct ShareStore {
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStorage>,
    state: RwLock<ClientState>,
    placeholders: AtomicU64,
}

impl ShareStore {
    pub fn new(transport: Arc<dyn Transport>, tokens: Arc<dyn TokenStorage>) -> Self {
        Self {
            transport,
            tokens,
            state: RwLock::new(ClientState::default()),
            placeholders: AtomicU64::new(0),
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut ClientState) -> R) -> R {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut state)
    }

    fn read<R>(&self, f: impl FnOnce(&ClientState) -> R) -> R {
        let state = self
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&state)
    }

    fn set_loading(&self, loading: bool) {
        self.update(|s| s.loading = loading);
    }

    /// Execute an operation with the stored token.
    /// An authentication failure signs the user out before returning.
    async fn request(&self, query: &str, variables: Value) -> Result<Value, ClientError> {
        let token = self.tokens.get().unwrap_or_default();

        let result = match self.transport.execute(query, variables, &token).await {
            Ok(response) => response.into_data(),
            Err(e) => Err(e),
        };

        if let Err(ClientError::Authentication(message)) = &result {
            warn!(error = %message, "Session rejected by server");
            self.update(|s| s.auth_error = Some(message.clone()));
            self.signout_user();
        }

        result
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    pub async fn get_current_user(&self) -> Result<(), ClientError> {
        self.set_loading(true);
        let result = self.request(queries::GET_CURRENT_USER, json!({})).await;
        self.set_loading(false);

        let user: Option<User> = match result.and_then(|mut data| take_field(&mut data, "getCurrentUser"))
        {
            Ok(user) => user,
            Err(e) => {
                error!(error = %e, "Failed to load current user");
                return Err(e);
            }
        };

        self.update(|s| s.user = user);
        Ok(())
    }

    pub async fn get_posts(&self) -> Result<(), ClientError> {
        self.set_loading(true);
        let result = self.request(queries::GET_POSTS, json!({})).await;
        self.set_loading(false);

        let posts: Vec<Post> = match result.and_then(|mut data| take_field(&mut data, "getPosts"))
        {
            Ok(posts) => posts,
            Err(e) => {
                error!(error = %e, "Failed to load posts");
                return Err(e);
            }
        };

        self.update(|s| s.posts = posts);
        Ok(())
    }

    /// Prepend the post immediately, then swap in the server's copy.
    /// On failure the placeholder is withdrawn and `error` is set.
    ///
    /// Placeholder ids are negative counters (`-1`, `-2`, ...), one per
    /// call, so overlapping calls only ever touch their own entry.
    pub async fn add_post(&self, input: NewPostInput) -> Result<Post, ClientError> {
        let variables = serde_json::to_value(&input)?;
        let serial = self.placeholders.fetch_add(1, Ordering::Relaxed) + 1;
        let placeholder_id = format!("-{serial}");
        self.update(|s| {
            s.loading = true;
            s.posts.insert(0, input.optimistic(placeholder_id.clone()));
        });

        let result = self
            .request(queries::ADD_POST, variables)
            .await
            .and_then(|mut data| take_field::<Post>(&mut data, "addPost"));

        self.update(|s| {
            s.loading = false;
            let placeholder = s.posts.iter().position(|p| p.id == placeholder_id);
            match (&result, placeholder) {
                (Ok(post), Some(index)) => s.posts[index] = post.clone(),
                (Ok(post), None) => s.posts.insert(0, post.clone()),
                (Err(e), index) => {
                    if let Some(index) = index {
                        s.posts.remove(index);
                    }
                    s.error = Some(e.to_string());
                }
            }
        });

        match &result {
            Ok(post) => info!(post_id = %post.id, "Post added"),
            Err(e) => error!(error = %e, "Failed to add post"),
        }
        result
    }

    pub async fn signin_user(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let variables = json!({ "username": username, "password": password });
        self.authenticate(queries::SIGNIN_USER, "signinUser", variables)
            .await
    }

    pub async fn signup_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        let variables = json!({ "username": username, "email": email, "password": password });
        self.authenticate(queries::SIGNUP_USER, "signupUser", variables)
            .await
    }

    /// Store the issued token, then reload the current user
    async fn authenticate(
        &self,
        query: &str,
        field: &str,
        variables: Value,
    ) -> Result<(), ClientError> {
        self.update(|s| {
            s.error = None;
            s.loading = true;
        });

        let result = self.request(query, variables).await.and_then(|mut data| {
            let mut payload: Value = take_field(&mut data, field)?;
            take_field::<String>(&mut payload, "token")
        });
        self.set_loading(false);

        match result {
            Ok(token) => {
                self.tokens.set(&token);
                info!(operation = %field, "Session token stored");
                self.get_current_user().await
            }
            Err(e) => {
                error!(error = %e, operation = %field, "Authentication failed");
                self.update(|s| s.error = Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Forget the user and token, drop cached data and go home.
    /// `auth_error` is kept so the reason can still be shown.
    pub fn signout_user(&self) {
        self.tokens.set("");
        self.update(|s| {
            s.user = None;
            s.posts.clear();
            s.error = None;
            s.loading = false;
            s.location = Route::Home.path();
        });
        info!("User signed out");
    }

    /// Move to `path` through the auth guard.
    /// Returns the route displayed, or `None` (location unchanged) for unknown paths.
    pub fn navigate(&self, path: &str) -> Option<Route> {
        let signed_in = self.read(|s| s.user.is_some());
        let navigation = router::resolve(path, signed_in)?;
        let route = navigation.route().clone();
        self.update(|s| s.location = route.path());
        Some(route)
    }

    pub fn clear_auth_error(&self) {
        self.update(|s| s.auth_error = None);
    }

    // ------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------

    pub fn state(&self) -> ClientState {
        self.read(ClientState::clone)
    }

    pub fn user(&self) -> Option<User> {
        self.read(|s| s.user.clone())
    }

    pub fn user_favorites(&self) -> Option<Vec<Post>> {
        self.read(|s| s.user.as_ref().map(|u| u.favorites.clone()))
    }

    pub fn posts(&self) -> Vec<Post> {
        self.read(|s| s.posts.clone())
    }

    pub fn loading(&self) -> bool {
        self.read(|s| s.loading)
    }

    pub fn error(&self) -> Option<String> {
        self.read(|s| s.error.clone())
    }

    pub fn auth_error(&self) -> Option<String> {
        self.read(|s| s.auth_error.clone())
    }

    pub fn location(&self) -> String {
        self.read(|s| s.location.clone())
    }
}
