//! Session middleware
//!
//! Resolves the `Authorization` header into a [`Session`] stored in the
//! request extensions. A missing or blank header is anonymous, not an
//! error; a bad or expired token is recorded as `Rejected` and the GraphQL
//! handler answers it with an `AuthenticationError`.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpMessage,
};
use crypto_core::{verify_token, Claims, TokenError};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of authenticating one request
#[derive(Debug, Clone)]
pub enum Session {
    Anonymous,
    Authenticated(Claims),
    Rejected(TokenError),
}

impl Session {
    /// Authenticate a raw `Authorization` header value
    pub fn from_header(header: Option<&str>, secret: &str) -> Self {
        match header.and_then(extract_token) {
            None => Session::Anonymous,
            Some(token) => match verify_token(token, secret) {
                Ok(claims) => Session::Authenticated(claims),
                Err(e) => Session::Rejected(e),
            },
        }
    }
}

/// Token carried by a header value: either the raw token or `Bearer <token>`.
/// Blank values (sent by clients after sign-out) carry no token.
pub fn extract_token(header: &str) -> Option<&str> {
    let value = header.trim();
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Session middleware factory
#[derive(Clone)]
pub struct SessionMiddleware {
    secret: Arc<str>,
}

impl SessionMiddleware {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service,
            secret: self.secret.clone(),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: S,
    secret: Arc<str>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let session = Session::from_header(header, &self.secret);
        match &session {
            Session::Authenticated(claims) => {
                debug!(username = %claims.username, "Request authenticated");
            }
            Session::Rejected(e) => {
                warn!(error = %e, path = %req.path(), "Rejected session token");
            }
            Session::Anonymous => {}
        }

        req.extensions_mut().insert(session);

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res)
        })
    }
}
