//! Controller for a single wishlist and its products.
//!
//! The displayed wishlist is only ever a value the server returned: product
//! changes adopt the full wishlist from the response, nothing is patched
//! locally. Two overlapping changes may complete in either order; whichever
//! is processed last is what the user sees.
//!
//! Opening a different wishlist (or closing this one) starts a new epoch.
//! Responses that belong to an older epoch are dropped.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, instrument};
use wishlist_core::policy::{self, Action};
use wishlist_core::{
    Affordances, Identity, InviteDraft, ProductForm, ProductId, ValidationError, Wishlist,
    WishlistId,
};

use super::{ActionOutcome, Confirm, Feedback};
use crate::api::WishlistApi;
use crate::error::{ClientError, add_breadcrumb};
use crate::routes::Route;

const LOAD_FAILED: &str =
    "Failed to load wishlist. You might not have access or it might not exist.";
const REMOVE_PROMPT: &str = "Are you sure you want to remove this product?";
const DELETE_PROMPT: &str = "Are you sure you want to delete this wishlist?";
const NOTHING_OPEN: &str = "No wishlist is open.";

/// Mutating actions that carry their own feedback line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    AddProduct,
    UpdateProduct,
    RemoveProduct,
    DeleteWishlist,
    Invite,
}

impl ActionKind {
    /// Message shown when the request fails without a usable server reason.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::AddProduct => "Failed to add product.",
            Self::UpdateProduct => "Failed to update product.",
            Self::RemoveProduct => "Failed to remove product.",
            Self::DeleteWishlist => "Failed to delete wishlist. You might not be the owner.",
            Self::Invite => "Failed to send invite.",
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::AddProduct => "add_product",
            Self::UpdateProduct => "update_product",
            Self::RemoveProduct => "remove_product",
            Self::DeleteWishlist => "delete_wishlist",
            Self::Invite => "invite",
        }
    }
}

/// Load state of the open wishlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    Unloaded,
    Loading,
    Loaded(Wishlist),
    LoadFailed(String),
}

/// Everything needed to render the wishlist screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishlistView {
    pub wishlist_id: Option<WishlistId>,
    pub phase: LoadPhase,
    pub feedback: BTreeMap<ActionKind, Feedback>,
    pub in_flight: BTreeSet<ActionKind>,
    pub affordances: Affordances,
    pub identity: Option<Identity>,
}

impl WishlistView {
    #[must_use]
    pub const fn wishlist(&self) -> Option<&Wishlist> {
        match &self.phase {
            LoadPhase::Loaded(wishlist) => Some(wishlist),
            _ => None,
        }
    }

    #[must_use]
    pub fn feedback(&self, kind: ActionKind) -> Option<&Feedback> {
        self.feedback.get(&kind)
    }

    #[must_use]
    pub fn is_busy(&self, kind: ActionKind) -> bool {
        self.in_flight.contains(&kind)
    }
}

struct ControllerState {
    wishlist_id: Option<WishlistId>,
    epoch: u64,
    phase: LoadPhase,
    feedback: BTreeMap<ActionKind, Feedback>,
    in_flight: BTreeMap<ActionKind, usize>,
}

impl ControllerState {
    const fn new() -> Self {
        Self {
            wishlist_id: None,
            epoch: 0,
            phase: LoadPhase::Unloaded,
            feedback: BTreeMap::new(),
            in_flight: BTreeMap::new(),
        }
    }

    /// Forget the open wishlist and everything attached to it.
    fn reset(&mut self, wishlist_id: Option<WishlistId>) {
        self.epoch += 1;
        self.wishlist_id = wishlist_id;
        self.phase = LoadPhase::Unloaded;
        self.feedback.clear();
        self.in_flight.clear();
    }

    fn loaded(&self) -> Option<&Wishlist> {
        match &self.phase {
            LoadPhase::Loaded(wishlist) => Some(wishlist),
            _ => None,
        }
    }
}

/// An action that has been sent and not yet settled.
struct Ticket {
    kind: ActionKind,
    epoch: u64,
    wishlist_id: WishlistId,
}

/// Handle to the wishlist screen's state.
#[derive(Clone)]
pub struct WishlistController {
    api: WishlistApi,
    state: Arc<RwLock<ControllerState>>,
}

impl std::fmt::Debug for WishlistController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistController").finish_non_exhaustive()
    }
}

impl WishlistController {
    #[must_use]
    pub fn new(api: WishlistApi) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(ControllerState::new())),
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Open wishlist `id` and fetch it.
    ///
    /// Opening a different id drops everything from the previous one.
    /// Reloading the same id keeps action feedback.
    #[instrument(skip(self, id), fields(wishlist_id = %id))]
    pub async fn load(&self, id: &WishlistId) -> ActionOutcome {
        let epoch = {
            let mut state = self.state.write().await;
            if state.wishlist_id.as_ref() != Some(id) {
                state.reset(Some(id.clone()));
            }
            state.phase = LoadPhase::Loading;
            state.epoch
        };

        let result = self.api.get_wishlist(id).await;

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            debug!("Dropping wishlist response for a closed view");
            return ActionOutcome::Stale;
        }

        match result {
            Ok(wishlist) => {
                state.phase = LoadPhase::Loaded(wishlist);
                ActionOutcome::Applied
            }
            Err(e) => {
                e.report("load_wishlist");
                state.phase = LoadPhase::LoadFailed(LOAD_FAILED.to_string());
                if e.is_auth() {
                    ActionOutcome::Navigate(Route::Login)
                } else {
                    ActionOutcome::Failed(LOAD_FAILED.to_string())
                }
            }
        }
    }

    /// Fetch the open wishlist again.
    pub async fn reload(&self) -> ActionOutcome {
        let id = self.state.read().await.wishlist_id.clone();
        match id {
            Some(id) => self.load(&id).await,
            None => ActionOutcome::Failed(NOTHING_OPEN.to_string()),
        }
    }

    /// Leave the wishlist screen. Responses still in flight will be dropped.
    pub async fn close(&self) {
        self.state.write().await.reset(None);
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Validate `form` and add it as a new product.
    #[instrument(skip(self, form))]
    pub async fn add_product(&self, form: &ProductForm) -> ActionOutcome {
        let kind = ActionKind::AddProduct;
        let draft = match form.validate() {
            Ok(draft) => draft,
            Err(e) => return self.reject(kind, e).await,
        };
        let Some(ticket) = self.begin(kind).await else {
            return ActionOutcome::Failed(NOTHING_OPEN.to_string());
        };

        add_breadcrumb(
            "wishlist",
            "Adding product",
            Some(&[("wishlist_id", ticket.wishlist_id.as_str())]),
        );
        let result = self.api.add_product(&ticket.wishlist_id, &draft).await;
        self.settle(ticket, result, adopt).await
    }

    /// Validate `form` and replace product `product_id` with it.
    #[instrument(skip(self, form), fields(product_id = %product_id))]
    pub async fn update_product(&self, product_id: &ProductId, form: &ProductForm) -> ActionOutcome {
        let kind = ActionKind::UpdateProduct;
        let draft = match form.validate() {
            Ok(draft) => draft,
            Err(e) => return self.reject(kind, e).await,
        };
        let Some(ticket) = self.begin(kind).await else {
            return ActionOutcome::Failed(NOTHING_OPEN.to_string());
        };

        add_breadcrumb(
            "wishlist",
            "Updating product",
            Some(&[("product_id", product_id.as_str())]),
        );
        let result = self
            .api
            .update_product(&ticket.wishlist_id, product_id, &draft)
            .await;
        self.settle(ticket, result, adopt).await
    }

    /// Remove product `product_id` once the user confirms.
    #[instrument(skip(self, confirm), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: &ProductId, confirm: &impl Confirm) -> ActionOutcome {
        if self.state.read().await.wishlist_id.is_none() {
            return ActionOutcome::Failed(NOTHING_OPEN.to_string());
        }
        if !confirm.confirm(REMOVE_PROMPT) {
            return ActionOutcome::Declined;
        }
        let Some(ticket) = self.begin(ActionKind::RemoveProduct).await else {
            return ActionOutcome::Stale;
        };

        add_breadcrumb(
            "wishlist",
            "Removing product",
            Some(&[("product_id", product_id.as_str())]),
        );
        let result = self.api.remove_product(&ticket.wishlist_id, product_id).await;
        self.settle(ticket, result, adopt).await
    }

    // =========================================================================
    // Owner actions
    // =========================================================================

    /// Delete the open wishlist. Owner only; asks for confirmation first.
    ///
    /// On success the wishlist is dropped and the caller is sent back to the
    /// dashboard.
    #[instrument(skip(self, confirm))]
    pub async fn delete_wishlist(&self, confirm: &impl Confirm) -> ActionOutcome {
        let kind = ActionKind::DeleteWishlist;
        if let Err(outcome) = self.require_owner(kind, Action::DeleteWishlist, true).await {
            return outcome;
        }
        if !confirm.confirm(DELETE_PROMPT) {
            return ActionOutcome::Declined;
        }
        let Some(ticket) = self.begin(kind).await else {
            return ActionOutcome::Stale;
        };

        add_breadcrumb(
            "wishlist",
            "Deleting wishlist",
            Some(&[("wishlist_id", ticket.wishlist_id.as_str())]),
        );
        let result = self.api.delete_wishlist(&ticket.wishlist_id).await;
        self.settle(ticket, result, |state, ()| {
            state.reset(None);
            ActionOutcome::Navigate(Route::Dashboard)
        })
        .await
    }

    /// Invite `email` to collaborate, then reload to pick up the new
    /// collaborator list.
    #[instrument(skip(self, email))]
    pub async fn invite(&self, email: &str) -> ActionOutcome {
        let kind = ActionKind::Invite;
        let draft = match InviteDraft::new(email) {
            Ok(draft) => draft,
            Err(e) => return self.reject(kind, e).await,
        };
        if let Err(outcome) = self.require_owner(kind, Action::Invite, false).await {
            return outcome;
        }
        let Some(ticket) = self.begin(kind).await else {
            return ActionOutcome::Failed(NOTHING_OPEN.to_string());
        };

        add_breadcrumb(
            "wishlist",
            "Inviting collaborator",
            Some(&[("wishlist_id", ticket.wishlist_id.as_str())]),
        );
        let result = self.api.invite(&ticket.wishlist_id, &draft).await;
        let invited = draft.email().to_string();
        let outcome = self
            .settle(ticket, result, move |state, receipt| {
                let message = if receipt.message.is_empty() {
                    format!("Invitation sent to {invited}.")
                } else {
                    receipt.message
                };
                state.feedback.insert(kind, Feedback::Success(message));
                ActionOutcome::Applied
            })
            .await;

        if outcome != ActionOutcome::Applied {
            return outcome;
        }
        match self.reload().await {
            ActionOutcome::Navigate(route) => ActionOutcome::Navigate(route),
            _ => ActionOutcome::Applied,
        }
    }

    // =========================================================================
    // Reading
    // =========================================================================

    /// Current state with affordances evaluated for the current identity.
    pub async fn snapshot(&self) -> WishlistView {
        let identity = self.api.session().identity().await;
        let state = self.state.read().await;

        let affordances = state.loaded().map_or_else(Affordances::default, |wishlist| {
            Affordances::evaluate(identity.as_ref(), wishlist)
        });

        WishlistView {
            wishlist_id: state.wishlist_id.clone(),
            phase: state.phase.clone(),
            feedback: state.feedback.clone(),
            in_flight: state
                .in_flight
                .iter()
                .filter(|(_, count)| **count > 0)
                .map(|(kind, _)| *kind)
                .collect(),
            affordances,
            identity,
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn reject(&self, kind: ActionKind, error: ValidationError) -> ActionOutcome {
        self.state
            .write()
            .await
            .feedback
            .insert(kind, Feedback::Error(error.to_string()));
        ActionOutcome::Invalid(error)
    }

    /// Check the policy for an owner-only action against the loaded wishlist.
    ///
    /// With `require_loaded` unset, an unloaded wishlist passes and the
    /// server decides.
    async fn require_owner(
        &self,
        kind: ActionKind,
        action: Action,
        require_loaded: bool,
    ) -> Result<(), ActionOutcome> {
        let identity = self.api.session().identity().await;
        let mut state = self.state.write().await;

        let allowed = match state.loaded() {
            Some(wishlist) => policy::permits(identity.as_ref(), wishlist, action),
            None if require_loaded => {
                return Err(ActionOutcome::Failed(NOTHING_OPEN.to_string()));
            }
            None => true,
        };
        if allowed {
            return Ok(());
        }

        let message = match action {
            Action::DeleteWishlist => "Only the owner can delete this wishlist.",
            _ => "Only the owner can invite collaborators.",
        };
        state
            .feedback
            .insert(kind, Feedback::Error(message.to_string()));
        Err(ActionOutcome::Failed(message.to_string()))
    }

    async fn begin(&self, kind: ActionKind) -> Option<Ticket> {
        let mut state = self.state.write().await;
        let wishlist_id = state.wishlist_id.clone()?;
        *state.in_flight.entry(kind).or_default() += 1;
        Some(Ticket {
            kind,
            epoch: state.epoch,
            wishlist_id,
        })
    }

    /// Apply a response if the view it was issued from is still open.
    async fn settle<T>(
        &self,
        ticket: Ticket,
        result: Result<T, ClientError>,
        apply: impl FnOnce(&mut ControllerState, T) -> ActionOutcome,
    ) -> ActionOutcome {
        let mut state = self.state.write().await;
        if state.epoch != ticket.epoch {
            debug!(action = ticket.kind.as_str(), "Dropping response for a closed view");
            return ActionOutcome::Stale;
        }

        if let Some(count) = state.in_flight.get_mut(&ticket.kind) {
            *count = count.saturating_sub(1);
        }

        match result {
            Ok(value) => {
                state.feedback.remove(&ticket.kind);
                apply(&mut *state, value)
            }
            Err(e) => {
                e.report(ticket.kind.as_str());
                let message = e.message_or(ticket.kind.failure_message());
                state
                    .feedback
                    .insert(ticket.kind, Feedback::Error(message.clone()));
                if e.is_auth() {
                    ActionOutcome::Navigate(Route::Login)
                } else {
                    ActionOutcome::Failed(message)
                }
            }
        }
    }
}

/// Adopt the wishlist the server returned as the displayed state.
fn adopt(state: &mut ControllerState, wishlist: Wishlist) -> ActionOutcome {
    state.phase = LoadPhase::Loaded(wishlist);
    ActionOutcome::Applied
}
