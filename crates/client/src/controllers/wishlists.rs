//! Controller for the wishlist collection (the dashboard).
//!
//! Every change is followed by a fresh list fetch; the list is never edited
//! locally.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, instrument};
use wishlist_core::{Identity, UserId, ValidationError, Wishlist, WishlistDraft, WishlistId};

use super::{ActionOutcome, Confirm, Feedback};
use crate::api::WishlistApi;
use crate::error::{ClientError, add_breadcrumb};
use crate::routes::Route;

const LOAD_FAILED: &str = "Failed to load wishlists.";
const CREATE_FAILED: &str = "Failed to create wishlist.";
const DELETE_FAILED: &str = "Failed to delete wishlist. You might not be the owner.";
const DELETE_PROMPT: &str = "Are you sure you want to delete this wishlist?";

/// Load state of the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListPhase {
    Idle,
    Loading,
    Loaded(Vec<Wishlist>),
    Failed(String),
}

/// Everything needed to render the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishlistsView {
    pub phase: ListPhase,
    /// Result of the last create or delete.
    pub feedback: Option<Feedback>,
    pub busy: bool,
    pub identity: Option<Identity>,
}

impl WishlistsView {
    #[must_use]
    pub fn wishlists(&self) -> &[Wishlist] {
        match &self.phase {
            ListPhase::Loaded(wishlists) => wishlists,
            _ => &[],
        }
    }

    /// Whether the current user may delete `wishlist` (owner only).
    #[must_use]
    pub fn can_delete(&self, wishlist: &Wishlist) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|identity| wishlist_core::policy::is_owner(identity, wishlist))
    }
}

struct ListState {
    epoch: u64,
    phase: ListPhase,
    feedback: Option<Feedback>,
    in_flight: usize,
}

/// Handle to the dashboard's state.
#[derive(Clone)]
pub struct WishlistsController {
    api: WishlistApi,
    state: Arc<RwLock<ListState>>,
}

impl std::fmt::Debug for WishlistsController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistsController").finish_non_exhaustive()
    }
}

impl WishlistsController {
    #[must_use]
    pub fn new(api: WishlistApi) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(ListState {
                epoch: 0,
                phase: ListPhase::Idle,
                feedback: None,
                in_flight: 0,
            })),
        }
    }

    /// Fetch the list.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> ActionOutcome {
        let epoch = {
            let mut state = self.state.write().await;
            state.phase = ListPhase::Loading;
            state.epoch
        };

        let result = self.api.list_wishlists().await;

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            return ActionOutcome::Stale;
        }
        match result {
            Ok(wishlists) => {
                debug!(count = wishlists.len(), "Dashboard refreshed");
                state.phase = ListPhase::Loaded(wishlists);
                ActionOutcome::Applied
            }
            Err(e) => {
                e.report("list_wishlists");
                state.phase = ListPhase::Failed(LOAD_FAILED.to_string());
                failure(&e, LOAD_FAILED)
            }
        }
    }

    /// Create a wishlist, then refresh the list.
    ///
    /// The title is checked locally first; nothing is sent if it is blank.
    #[instrument(skip(self, title, description))]
    pub async fn create(&self, title: &str, description: &str) -> ActionOutcome {
        let draft = match WishlistDraft::new(title, description) {
            Ok(draft) => draft,
            Err(e) => return self.reject(e).await,
        };

        add_breadcrumb("dashboard", "Creating wishlist", None);
        let epoch = self.begin().await;
        let result = self.api.create_wishlist(&draft).await;
        self.finish(epoch, result.map(|_| ()), CREATE_FAILED).await
    }

    /// Delete wishlist `id` once the user confirms, then refresh the list.
    ///
    /// Offered to the owner only; the server has the final say.
    #[instrument(skip(self, confirm), fields(wishlist_id = %id))]
    pub async fn delete(&self, id: &WishlistId, confirm: &impl Confirm) -> ActionOutcome {
        if let Some(owner) = self.known_owner(id).await {
            let me = self.api.session().identity().await.map(|identity| identity.id);
            if me.as_ref() != Some(&owner) {
                let message = "Only the owner can delete this wishlist.".to_string();
                self.state.write().await.feedback = Some(Feedback::Error(message.clone()));
                return ActionOutcome::Failed(message);
            }
        }
        if !confirm.confirm(DELETE_PROMPT) {
            return ActionOutcome::Declined;
        }

        add_breadcrumb("dashboard", "Deleting wishlist", Some(&[("wishlist_id", id.as_str())]));
        let epoch = self.begin().await;
        let result = self.api.delete_wishlist(id).await;
        self.finish(epoch, result, DELETE_FAILED).await
    }

    /// Forget the list; responses still in flight are dropped.
    pub async fn close(&self) {
        let mut state = self.state.write().await;
        state.epoch += 1;
        state.phase = ListPhase::Idle;
        state.feedback = None;
        state.in_flight = 0;
    }

    pub async fn snapshot(&self) -> WishlistsView {
        let identity = self.api.session().identity().await;
        let state = self.state.read().await;
        WishlistsView {
            phase: state.phase.clone(),
            feedback: state.feedback.clone(),
            busy: state.in_flight > 0,
            identity,
        }
    }

    async fn known_owner(&self, id: &WishlistId) -> Option<UserId> {
        match &self.state.read().await.phase {
            ListPhase::Loaded(wishlists) => wishlists
                .iter()
                .find(|w| &w.id == id)
                .map(|w| w.owner_id.clone()),
            _ => None,
        }
    }

    async fn reject(&self, error: ValidationError) -> ActionOutcome {
        self.state.write().await.feedback = Some(Feedback::Error(error.to_string()));
        ActionOutcome::Invalid(error)
    }

    async fn begin(&self) -> u64 {
        let mut state = self.state.write().await;
        state.in_flight += 1;
        state.epoch
    }

    async fn finish(&self, epoch: u64, result: Result<(), ClientError>, fallback: &str) -> ActionOutcome {
        {
            let mut state = self.state.write().await;
            if state.epoch != epoch {
                return ActionOutcome::Stale;
            }
            state.in_flight = state.in_flight.saturating_sub(1);

            if let Err(e) = result {
                e.report("dashboard");
                let message = e.message_or(fallback);
                state.feedback = Some(Feedback::Error(message));
                return failure(&e, fallback);
            }
            state.feedback = None;
        }

        match self.refresh().await {
            ActionOutcome::Navigate(route) => ActionOutcome::Navigate(route),
            ActionOutcome::Stale => ActionOutcome::Stale,
            _ => ActionOutcome::Applied,
        }
    }
}

fn failure(error: &ClientError, fallback: &str) -> ActionOutcome {
    if error.is_auth() {
        ActionOutcome::Navigate(Route::Login)
    } else {
        ActionOutcome::Failed(error.message_or(fallback))
    }
}
