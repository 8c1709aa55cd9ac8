//! Credential hashing and session token primitives shared by the Share services

pub mod jwt;
pub mod password;

pub use jwt::{issue_token, verify_token, Claims, TokenError};
pub use password::{hash_password, verify_password, PasswordError};
