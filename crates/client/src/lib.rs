//! Wishlist client library.
//!
//! Everything a front-end needs to talk to the shared wishlist service:
//!
//! - [`session`] - Who is logged in, and the single durable credential
//! - [`api`] - Typed gateway over the HTTP API, with the credential injected
//! - [`controllers`] - State machines for the wishlist detail view, the
//!   wishlist collection and the login/register form
//! - [`routes`] - Route table and the authentication gate in front of it
//!
//! The front-end only reads controller snapshots and calls controller
//! operations. Navigation is returned as a [`routes::Route`] and executed by
//! the caller.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod controllers;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod testing;

pub use error::{ClientError, ErrorKind};
pub use state::AppState;
