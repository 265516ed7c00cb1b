//! Wishlist Core - Shared domain types.
//!
//! This crate provides the types used by every wishlist component:
//! - `client` - Session store, resource gateway and controllers
//! - `cli` - Terminal front-end driving the client
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no storage. Everything here can be evaluated synchronously and
//! tested without a runtime.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, prices, timestamps and the wishlist aggregate
//! - [`draft`] - Validated user input, checked before anything reaches the network
//! - [`policy`] - Owner/collaborator access rules that gate UI affordances

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod draft;
pub mod policy;
pub mod types;

pub use draft::*;
pub use policy::{Action, Affordances, Role};
pub use types::*;
