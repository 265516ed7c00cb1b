//! Session store: the current identity and its credential.
//!
//! The session owns the only piece of state shared across every API call.
//! It is written by [`SessionStore::establish`], [`SessionStore::revalidate`]
//! and [`SessionStore::terminate`] (plus [`SessionStore::invalidate`] when the
//! gateway sees a 401); everything else only reads it.
//!
//! An identity is held if and only if a validated credential is installed.

mod draft;
mod storage;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use wishlist_core::Identity;

pub use draft::{LoginDraft, SignupDraft};
pub use storage::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, StorageError, TOKEN_KEY,
};

use crate::api::{ApiRequest, LoginResponse, Transport};
use crate::error::{self, ClientError};

/// Where the session stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Startup validation has not finished yet.
    Pending,
    /// A validated credential is installed.
    Authenticated(Identity),
    /// No credential, or the stored one was rejected.
    Unauthenticated,
}

impl SessionStatus {
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::Pending | Self::Unauthenticated => None,
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

struct ActiveSession {
    identity: Identity,
    token: SecretString,
}

#[derive(Default)]
struct SessionState {
    /// Set once any operation has decided the session either way.
    settled: bool,
    /// Bumped every time a credential is installed or removed.
    generation: u64,
    /// Startup validations still waiting on the server.
    revalidating: usize,
    active: Option<ActiveSession>,
}

impl SessionState {
    fn status(&self) -> SessionStatus {
        match (&self.active, self.settled) {
            (Some(active), _) => SessionStatus::Authenticated(active.identity.clone()),
            (None, false) => SessionStatus::Pending,
            (None, true) => SessionStatus::Unauthenticated,
        }
    }

    fn holds(&self, token: &SecretString) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.token.expose_secret() == token.expose_secret())
    }

    fn install(&mut self, identity: Identity, token: SecretString) {
        error::set_sentry_user(&identity);
        self.generation += 1;
        self.settled = true;
        self.active = Some(ActiveSession { identity, token });
    }

    fn reset(&mut self) {
        error::clear_sentry_user();
        self.generation += 1;
        self.settled = true;
        self.active = None;
    }
}

struct SessionInner {
    transport: Arc<dyn Transport>,
    storage: Arc<dyn CredentialStore>,
    state: RwLock<SessionState>,
}

impl SessionInner {
    /// Clear durable storage, but only if it still holds `token`.
    ///
    /// A newer login may already have replaced it.
    fn forget(&self, token: &SecretString) {
        let stored = match self.storage.load() {
            Ok(Some(stored)) => stored.expose_secret() == token.expose_secret(),
            Ok(None) => false,
            Err(_) => true,
        };
        if stored {
            self.clear_storage();
        }
    }

    fn clear_storage(&self) {
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Failed to clear stored credential");
        }
    }
}

/// Cloneable handle to the session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a session over `transport`, persisting the credential in `storage`.
    ///
    /// The session starts [`SessionStatus::Pending`]; call
    /// [`revalidate`](Self::revalidate) before rendering anything private.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, storage: Arc<dyn CredentialStore>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                transport,
                storage,
                state: RwLock::new(SessionState::default()),
            }),
        }
    }

    /// Current status.
    pub async fn status(&self) -> SessionStatus {
        self.inner.state.read().await.status()
    }

    /// Current identity, if authenticated.
    pub async fn identity(&self) -> Option<Identity> {
        self.inner
            .state
            .read()
            .await
            .active
            .as_ref()
            .map(|active| active.identity.clone())
    }

    /// The installed credential, if any.
    pub async fn credential(&self) -> Option<SecretString> {
        self.inner
            .state
            .read()
            .await
            .active
            .as_ref()
            .map(|active| active.token.clone())
    }

    /// Log in.
    ///
    /// On success the credential is written to durable storage, then
    /// installed together with the identity. On failure a previous session,
    /// if there was one, is left exactly as it was; with no previous session
    /// the status becomes [`SessionStatus::Unauthenticated`], unless a
    /// startup validation is still running, in which case it stays
    /// [`SessionStatus::Pending`] until that validation answers.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Auth`] for rejected credentials
    /// - [`ClientError::Storage`] if the credential could not be persisted
    /// - any transport or payload error
    #[instrument(skip(self, draft), fields(login = %draft.email_or_username()))]
    pub async fn establish(&self, draft: &LoginDraft) -> Result<Identity, ClientError> {
        let result = self.login(draft).await;

        let mut state = self.inner.state.write().await;
        let installed = result.and_then(|(token, identity)| {
            self.inner.storage.save(&token)?;
            state.install(identity.clone(), token);
            Ok(identity)
        });
        if installed.is_err() && state.active.is_none() && state.revalidating == 0 {
            state.settled = true;
        }
        drop(state);

        let identity = installed?;
        info!(user_id = %identity.id, "Logged in");
        Ok(identity)
    }

    async fn login(&self, draft: &LoginDraft) -> Result<(SecretString, Identity), ClientError> {
        let request = ApiRequest::post("/auth/login").with_json(&draft.to_body())?;
        let response = self
            .inner
            .transport
            .send(request)
            .await?
            .error_for_status()?;
        let (token, identity) = response.json::<LoginResponse>()?.into_parts();
        Ok((SecretString::from(token), identity))
    }

    /// Create an account. Never logs in; the caller moves to the login step.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Rejected`] with the server's reason (for
    /// example a taken username), or any transport error.
    #[instrument(skip(self, draft), fields(username = %draft.username()))]
    pub async fn register(&self, draft: &SignupDraft) -> Result<(), ClientError> {
        let request = ApiRequest::post("/auth/signup").with_json(&draft.to_body())?;
        self.inner
            .transport
            .send(request)
            .await?
            .error_for_status()?;
        info!("Account registered");
        Ok(())
    }

    /// Check the stored credential against the server.
    ///
    /// With nothing stored this settles as unauthenticated without a network
    /// call. Otherwise a confirmed credential is installed; any failure at
    /// all purges it. If a login or logout lands while the server is being
    /// asked, the answer is dropped and the newer session stands. Never
    /// errors; returns the status as it is once this call is done.
    #[instrument(skip(self))]
    pub async fn revalidate(&self) -> SessionStatus {
        let (token, generation) = {
            let mut state = self.inner.state.write().await;
            let token = match self.inner.storage.load() {
                Ok(Some(token)) => token,
                Ok(None) => {
                    if state.active.is_none() {
                        state.settled = true;
                    }
                    return state.status();
                }
                Err(e) => {
                    warn!(error = %e, "Could not read stored credential");
                    if state.active.is_none() {
                        self.inner.clear_storage();
                        state.reset();
                    }
                    return state.status();
                }
            };
            state.revalidating += 1;
            (token, state.generation)
        };

        let result = self.validate(&token).await;

        let mut state = self.inner.state.write().await;
        state.revalidating = state.revalidating.saturating_sub(1);
        if state.generation != generation {
            debug!("Session changed during validation; ignoring answer");
            return state.status();
        }

        match result {
            Ok(identity) => {
                info!(user_id = %identity.id, "Stored credential accepted");
                state.install(identity, token);
            }
            Err(e) => {
                warn!(error = %e, "Stored credential rejected; purging");
                self.inner.forget(&token);
                state.reset();
            }
        }
        state.status()
    }

    async fn validate(&self, token: &SecretString) -> Result<Identity, ClientError> {
        let request = ApiRequest::get("/auth/validate").with_bearer(token.clone());
        let response = self
            .inner
            .transport
            .send(request)
            .await?
            .error_for_status()?;
        response.json::<Identity>()
    }

    /// Log out. Idempotent; never errors.
    #[instrument(skip(self))]
    pub async fn terminate(&self) {
        let mut state = self.inner.state.write().await;
        self.inner.clear_storage();
        state.reset();
        drop(state);
        info!("Logged out");
    }

    /// Purge the session if `token` is still the installed credential.
    ///
    /// Used by the gateway after a 401. A credential installed by a newer
    /// login in the meantime is left alone, in memory and in storage.
    pub async fn invalidate(&self, token: &SecretString) {
        let mut state = self.inner.state.write().await;
        if !state.holds(token) {
            return;
        }
        warn!("Credential rejected by server; purging session");
        self.inner.forget(token);
        state.reset();
    }
}
