//! Username/password authentication that hands out signed, self-contained
//! bearer tokens.
//!
//! An [`AuthenticationController`] looks credentials up in a
//! [`CredentialStore`] (an in-memory list or a SQLite `users` table), signs
//! the matching user's identity into a token with a [`TokenCodec`], and later
//! verifies such tokens without touching the store. Tokens can't be revoked:
//! [`AuthenticationController::invalidate`] is a no-op and a token stays
//! valid until it expires.
//!
//! The [`build_api_route_filter`] and [`with_auth`] filters expose the
//! controller over warp.

mod auth;
mod config;
mod error;
mod password;
mod routes;
mod store;
mod token;
mod types;

pub use auth::*;
pub use config::*;
pub use error::*;
pub use password::*;
pub use routes::*;
pub use store::*;
pub use token::*;
pub use types::*;
