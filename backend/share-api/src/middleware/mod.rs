//! HTTP middleware

pub mod session;

pub use session::{extract_token, Session, SessionMiddleware};
