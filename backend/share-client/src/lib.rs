//! Share client
//!
//! Client-side state for the Share API: a [`Transport`] that executes
//! GraphQL operations, a [`ShareStore`] holding the signed-in user and the
//! fetched posts, and a [`router`] with the auth guard.

pub mod api;
pub mod queries;
pub mod router;
pub mod store;

pub use api::{ClientError, HttpTransport, Transport, DEFAULT_ENDPOINT};
pub use router::Route;
pub use store::{
    ClientState, MemoryTokenStorage, NewPostInput, Post, ShareStore, TokenStorage, User,
};
