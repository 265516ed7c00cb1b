//! The wishlist aggregate: a wishlist together with its products.
//!
//! A wishlist is always refreshed wholesale from the server. Nothing in this
//! module mutates a wishlist; the client replaces the whole value with the
//! server's latest response after every change.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Price, ProductId, UserId, WishlistId};

/// A shared wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    /// Wishlist ID.
    pub id: WishlistId,
    /// Title shown in lists and headings.
    pub title: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// The single owning user.
    pub owner_id: UserId,
    /// The owner's display name.
    pub owner_username: String,
    /// Additional users granted access.
    #[serde(default)]
    pub collaborator_ids: BTreeSet<UserId>,
    /// Products in server order.
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Wishlist {
    /// Look up a product by ID.
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Whether the given user is listed as a collaborator.
    #[must_use]
    pub fn has_collaborator(&self, user: &UserId) -> bool {
        self.collaborator_ids.contains(user)
    }

    /// Collaborator IDs joined for display, or `None` when there are none.
    #[must_use]
    pub fn collaborators_label(&self) -> Option<String> {
        if self.collaborator_ids.is_empty() {
            return None;
        }
        Some(
            self.collaborator_ids
                .iter()
                .map(UserId::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

/// A desired product. Only exists inside its wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product ID, unique within the wishlist.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Image to display for the product.
    pub image_url: String,
    /// Price as last confirmed by the server.
    pub price: Price,
    /// Who added the product.
    pub added_by_username: String,
    /// When the product was added.
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
    /// When the product was last changed. Equal to `created_at` if never edited.
    #[serde(with = "super::timestamp")]
    pub last_edited_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product was edited after it was added.
    ///
    /// Display-only; the server does not store an "edited" flag.
    #[must_use]
    pub fn was_edited(&self) -> bool {
        self.last_edited_at > self.created_at
    }
}
