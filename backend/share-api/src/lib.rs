//! Share API library
//! Re-exports modules for the binary and integration tests

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod schema;
