//! Core types for the wishlist domain.
//!
//! This module provides type-safe wrappers for common domain concepts and
//! the wishlist aggregate as the server returns it.

pub mod email;
pub mod id;
pub mod identity;
pub mod price;
pub mod timestamp;
pub mod wishlist;

pub use email::{Email, EmailError};
pub use id::*;
pub use identity::Identity;
pub use price::{Price, PriceError};
pub use wishlist::{Product, Wishlist};
