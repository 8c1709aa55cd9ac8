//! Client route table and auth guard
//!
//! Paths match case-insensitively; the `:postId` segment keeps its case.

pub const SIGNIN_PATH: &str = "/signin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Posts,
    Post { post_id: String },
    AddPost,
    Profile,
    Signin,
    Signup,
}

impl Route {
    /// Match a path, ignoring any query string, fragment or trailing slash
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let lower: Vec<String> = segments.iter().map(|s| s.to_ascii_lowercase()).collect();
        let lower: Vec<&str> = lower.iter().map(String::as_str).collect();

        match lower.as_slice() {
            [] => Some(Route::Home),
            ["posts"] => Some(Route::Posts),
            ["posts", _] => Some(Route::Post {
                post_id: segments[1].to_string(),
            }),
            ["post", "add"] => Some(Route::AddPost),
            ["profile"] => Some(Route::Profile),
            ["signin"] => Some(Route::Signin),
            ["signup"] => Some(Route::Signup),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Posts => "Posts",
            Route::Post { .. } => "Post",
            Route::AddPost => "AddPost",
            Route::Profile => "Profile",
            Route::Signin => "Signin",
            Route::Signup => "Signup",
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Posts => "/posts".to_string(),
            Route::Post { post_id } => format!("/posts/{post_id}"),
            Route::AddPost => "/post/add".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::Signin => SIGNIN_PATH.to_string(),
            Route::Signup => "/signup".to_string(),
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(self, Route::AddPost | Route::Profile)
    }
}

/// Outcome of guarding a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allow(Route),
    Redirect(Route),
}

impl Navigation {
    /// Route actually displayed
    pub fn route(&self) -> &Route {
        match self {
            Navigation::Allow(route) | Navigation::Redirect(route) => route,
        }
    }
}

/// Guarded routes send anonymous visitors to sign-in
pub fn guard(route: Route, signed_in: bool) -> Navigation {
    if route.requires_auth() && !signed_in {
        Navigation::Redirect(Route::Signin)
    } else {
        Navigation::Allow(route)
    }
}

/// Parse then guard; `None` for unknown paths
pub fn resolve(path: &str, signed_in: bool) -> Option<Navigation> {
    Route::parse(path).map(|route| guard(route, signed_in))
}
