//! State machines behind each screen.
//!
//! - [`WishlistController`] - one wishlist and its products
//! - [`WishlistsController`] - the wishlist collection (dashboard)
//! - [`AuthFlow`] - login and registration
//!
//! Controllers are cloneable handles with `&self` operations, so a second
//! action can start while the first is still waiting on the server. Their
//! state is only ever replaced with what the server last confirmed; failures
//! become a message and the previous state stays on screen.

mod auth;
mod wishlist;
mod wishlists;

use wishlist_core::ValidationError;

pub use auth::{AuthFlow, AuthMode, AuthOutcome};
pub use wishlist::{ActionKind, LoadPhase, WishlistController, WishlistView};
pub use wishlists::{ListPhase, WishlistsController, WishlistsView};

use crate::routes::Route;

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    /// Show `prompt` and return whether the user agreed.
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// How a controller action ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The server confirmed the change and the new state is displayed.
    Applied,
    /// The user declined the confirmation; nothing was sent.
    Declined,
    /// Local validation failed; nothing was sent.
    Invalid(ValidationError),
    /// The request failed; the message is shown next to the action.
    Failed(String),
    /// The user navigated away before the response arrived; it was dropped.
    Stale,
    /// The front-end should navigate here.
    Navigate(Route),
}

/// Inline message attached to one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Success(String),
    Error(String),
}

impl Feedback {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Error(message) => message,
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}
