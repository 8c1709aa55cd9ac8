//! Session token issuance and verification
//!
//! Tokens are HS256 JWTs signed with a shared secret. They carry the
//! identity of the signed-in user (`username`, `email`) plus the standard
//! `iat`/`exp` timestamps.
//!
//! ## Session model
//!
//! - Validity is a function of signature and expiry only
//! - The server keeps no session table and there is no revocation list
//! - No rotation, no refresh: a client signs in again once its token expires
//!
//! ## Usage
//!
//! ```rust
//! use chrono::Duration;
//! use crypto_core::jwt;
//!
//! let token = jwt::issue_token("alice", "alice@example.com", "secret", Duration::hours(1))
//!     .expect("token should sign");
//! let claims = jwt::verify_token(&token, "secret").expect("token should verify");
//! assert_eq!(claims.username, "alice");
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Default session lifetime
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3600;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

// ============================================================================
// Data Structures
// ============================================================================

/// Claims embedded in a session token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Username of the signed-in user
    pub username: String,
    /// Email address of the signed-in user
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

// ============================================================================
// Token Generation
// ============================================================================

/// Sign a token for `username`/`email` that expires after `ttl`
///
/// ## Errors
///
/// Returns `TokenError::Signing` if the secret is empty, `ttl` pushes the
/// expiry past the representable date range, or encoding fails.
pub fn issue_token(
    username: &str,
    email: &str,
    secret: &str,
    ttl: Duration,
) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::Signing("signing secret is empty".to_string()));
    }

    let now = Utc::now();
    let expires_at = now
        .checked_add_signed(ttl)
        .ok_or_else(|| TokenError::Signing(format!("token lifetime out of range: {ttl}")))?;

    let claims = Claims {
        username: username.to_string(),
        email: email.to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    encode(
        &Header::new(JWT_ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))
}

// ============================================================================
// Token Validation
// ============================================================================

/// Verify the signature and expiry of `token` and return its claims
///
/// Expiry is checked with zero leeway.
///
/// ## Errors
///
/// - `TokenError::Expired` when `exp` is in the past
/// - `TokenError::Invalid` for a bad signature or a malformed token
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = true;
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(e.to_string()),
    })
}

// ============================================================================
// Tests
// ============================================================================
