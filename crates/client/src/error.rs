//! Client error taxonomy with Sentry integration.
//!
//! Every remote or storage failure is converted into a [`ClientError`] at the
//! gateway boundary. Controllers never let one escape to the view layer: they
//! turn it into a message with [`ClientError::message_or`] and keep their last
//! good state.

use thiserror::Error;
use wishlist_core::{Identity, ValidationError};

use crate::api::TransportError;
use crate::session::StorageError;

/// Errors produced by the session store and the resource gateway.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Local input check failed; no request was made.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Missing, invalid or expired credential (HTTP 401).
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The resource does not exist or the caller may not see it (HTTP 403/404).
    #[error("Not found or forbidden: {0}")]
    NotFoundOrForbidden(String),

    /// The server refused the request (other HTTP 4xx).
    #[error("Rejected by server ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Server-provided reason.
        message: String,
    },

    /// The server failed (HTTP 5xx).
    #[error("Server error ({status})")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Server-provided reason, if the body had one.
        message: Option<String>,
    },

    /// No response was received.
    #[error("Network error: {0}")]
    Network(#[from] TransportError),

    /// A request or response body could not be (de)serialized.
    #[error("Malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// The durable credential store failed.
    #[error("Credential storage error: {0}")]
    Storage(#[from] StorageError),
}

/// The user-facing category of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Pre-flight validation; never reached the network.
    Validation,
    /// Credential rejected; the credential has been purged.
    Auth,
    /// Absent or inaccessible; deliberately not told apart.
    NotFoundOrForbidden,
    /// Server-side validation refused the request.
    Rejected,
    /// Network or server failure.
    Transport,
    /// Local credential storage failed.
    Storage,
}

const GENERIC_TRANSPORT_MESSAGE: &str = "Something went wrong talking to the server. Please try again.";
const GENERIC_NOT_FOUND_MESSAGE: &str = "Not found, or you do not have access.";
const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

impl ClientError {
    /// The category this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Auth(_) => ErrorKind::Auth,
            Self::NotFoundOrForbidden(_) => ErrorKind::NotFoundOrForbidden,
            Self::Rejected { .. } => ErrorKind::Rejected,
            Self::Server { .. } | Self::Network(_) | Self::Payload(_) => ErrorKind::Transport,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Whether this error means the user has to log in again.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// A message safe to show to the user.
    ///
    /// Server-provided reasons are surfaced when the server sent one, except
    /// for not-found/forbidden, which always gets the same text so that the
    /// existence of a resource is not leaked.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Auth(_) => SESSION_EXPIRED_MESSAGE.to_string(),
            Self::NotFoundOrForbidden(_) => GENERIC_NOT_FOUND_MESSAGE.to_string(),
            Self::Rejected { message, .. }
            | Self::Server {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Server { message: None, .. } | Self::Network(_) | Self::Payload(_) => {
                GENERIC_TRANSPORT_MESSAGE.to_string()
            }
            Self::Storage(_) => "Could not access saved login. Please log in again.".to_string(),
        }
    }

    /// The message for an action-scoped error line.
    ///
    /// Local validation and server-side refusals keep their own text; every
    /// other failure is described by `fallback`, which names the action.
    #[must_use]
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            Self::Validation(_) | Self::Rejected { .. } | Self::Auth(_) => self.user_message(),
            _ => fallback.to_string(),
        }
    }

    /// Log the error and, for server or network failures, capture it to Sentry.
    pub fn report(&self, action: &str) {
        match self.kind() {
            ErrorKind::Transport | ErrorKind::Storage => {
                let event_id = sentry::capture_error(self);
                tracing::error!(
                    error = %self,
                    action,
                    sentry_event_id = %event_id,
                    "Request failed"
                );
            }
            ErrorKind::Auth | ErrorKind::NotFoundOrForbidden | ErrorKind::Rejected => {
                tracing::warn!(error = %self, action, "Request refused");
            }
            ErrorKind::Validation => {
                tracing::debug!(error = %self, action, "Input rejected before sending");
            }
        }
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Set the Sentry user context from an authenticated identity.
///
/// Called after successful authentication to associate errors with users.
pub fn set_sentry_user(identity: &Identity) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(identity.id.to_string()),
            username: Some(identity.username.clone()),
            email: Some(identity.email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Called on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("wishlist", "Added product", Some(&[("wishlist_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
