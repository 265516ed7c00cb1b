//! Access policy for a wishlist.
//!
//! Pure predicates over the current identity and a loaded wishlist. The
//! result decides which actions the UI offers; it is not authorization. The
//! server enforces access on every request, so the rules here stay permissive
//! for product edits and strict only where ownership is unambiguous.
//!
//! Nothing here is cached. Callers evaluate the policy again whenever the
//! identity or the wishlist may have changed.

use serde::Serialize;

use crate::types::{Identity, Wishlist};

/// How the current identity relates to a wishlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// `identity.id == wishlist.owner_id`.
    Owner,
    /// Listed in `collaborator_ids`.
    Collaborator,
    /// Neither, but the server let the wishlist load.
    Viewer,
}

/// Something the user may try to do with a wishlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    View,
    AddProduct,
    EditProduct,
    RemoveProduct,
    DeleteWishlist,
    Invite,
}

/// Whether `identity` owns `wishlist`.
#[must_use]
pub fn is_owner(identity: &Identity, wishlist: &Wishlist) -> bool {
    identity.id == wishlist.owner_id
}

/// Classify `identity` against `wishlist`.
#[must_use]
pub fn role(identity: &Identity, wishlist: &Wishlist) -> Role {
    if is_owner(identity, wishlist) {
        Role::Owner
    } else if wishlist.has_collaborator(&identity.id) {
        Role::Collaborator
    } else {
        Role::Viewer
    }
}

/// Whether `action` should be offered to `identity`.
///
/// Without an identity nothing is offered. Deleting and inviting are
/// owner-only; viewing and product changes are offered to anyone who could
/// load the wishlist.
#[must_use]
pub fn permits(identity: Option<&Identity>, wishlist: &Wishlist, action: Action) -> bool {
    let Some(identity) = identity else {
        return false;
    };

    match action {
        Action::DeleteWishlist | Action::Invite => is_owner(identity, wishlist),
        Action::View | Action::AddProduct | Action::EditProduct | Action::RemoveProduct => true,
    }
}

/// Every affordance for one render of a wishlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Affordances {
    pub can_view: bool,
    pub can_add_product: bool,
    pub can_edit_product: bool,
    pub can_remove_product: bool,
    pub can_delete_wishlist: bool,
    pub can_invite: bool,
}

impl Affordances {
    /// Evaluate the policy for every action at once.
    #[must_use]
    pub fn evaluate(identity: Option<&Identity>, wishlist: &Wishlist) -> Self {
        let allowed = |action| permits(identity, wishlist, action);
        Self {
            can_view: allowed(Action::View),
            can_add_product: allowed(Action::AddProduct),
            can_edit_product: allowed(Action::EditProduct),
            can_remove_product: allowed(Action::RemoveProduct),
            can_delete_wishlist: allowed(Action::DeleteWishlist),
            can_invite: allowed(Action::Invite),
        }
    }

    /// Whether this set grants `action`.
    #[must_use]
    pub const fn allows(&self, action: Action) -> bool {
        match action {
            Action::View => self.can_view,
            Action::AddProduct => self.can_add_product,
            Action::EditProduct => self.can_edit_product,
            Action::RemoveProduct => self.can_remove_product,
            Action::DeleteWishlist => self.can_delete_wishlist,
            Action::Invite => self.can_invite,
        }
    }
}
