//! Application state shared by every screen.

use std::sync::Arc;

use crate::api::{ReqwestTransport, Transport, TransportError, WishlistApi};
use crate::config::ClientConfig;
use crate::controllers::{AuthFlow, WishlistController, WishlistsController};
use crate::session::{CredentialStore, FileCredentialStore, SessionStore};

/// Application state shared across all screens.
///
/// This struct is cheaply cloneable via `Arc`. Every controller built from
/// it shares the same session, so a logout or a rejected credential is seen
/// everywhere at once.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    session: SessionStore,
    api: WishlistApi,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    /// Create state talking to the configured API over HTTP, with the
    /// credential kept in the configured file.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config.api_base_url.clone(), config.request_timeout)?;
        let storage = FileCredentialStore::new(config.credential_path.clone());
        Ok(Self::with_parts(Arc::new(transport), Arc::new(storage)))
    }

    /// Create state over any transport and credential store.
    #[must_use]
    pub fn with_parts(transport: Arc<dyn Transport>, storage: Arc<dyn CredentialStore>) -> Self {
        let session = SessionStore::new(Arc::clone(&transport), storage);
        let api = WishlistApi::new(transport, session.clone());
        Self {
            inner: Arc::new(AppStateInner { session, api }),
        }
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Get a reference to the resource gateway.
    #[must_use]
    pub fn api(&self) -> &WishlistApi {
        &self.inner.api
    }

    /// A fresh controller for the wishlist screen.
    #[must_use]
    pub fn wishlist_controller(&self) -> WishlistController {
        WishlistController::new(self.inner.api.clone())
    }

    /// A fresh controller for the dashboard.
    #[must_use]
    pub fn wishlists_controller(&self) -> WishlistsController {
        WishlistsController::new(self.inner.api.clone())
    }

    /// A fresh login/register flow.
    #[must_use]
    pub fn auth_flow(&self) -> AuthFlow {
        AuthFlow::new(self.inner.session.clone())
    }
}
