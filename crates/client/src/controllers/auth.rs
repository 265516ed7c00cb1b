//! Login and registration form flow.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::error::ClientError;
use crate::routes::Route;
use crate::session::{LoginDraft, SessionStore, SignupDraft};

const LOGIN_FAILED: &str = "Login failed. Invalid credentials.";
const REGISTERED: &str = "Registration successful! Please login.";
const REGISTER_FAILED: &str = "Registration failed. Please try again.";

/// Which form is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

/// Result of submitting the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Logged in; go here.
    Navigate(Route),
    /// Stay on the form and show this message.
    Message(String),
}

/// Handle to the login/register screen.
#[derive(Clone)]
pub struct AuthFlow {
    session: SessionStore,
    mode: Arc<RwLock<AuthMode>>,
}

impl std::fmt::Debug for AuthFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFlow").finish_non_exhaustive()
    }
}

impl AuthFlow {
    #[must_use]
    pub fn new(session: SessionStore) -> Self {
        Self {
            session,
            mode: Arc::new(RwLock::new(AuthMode::Login)),
        }
    }

    pub async fn mode(&self) -> AuthMode {
        *self.mode.read().await
    }

    /// Switch between the login and register forms.
    pub async fn toggle_mode(&self) -> AuthMode {
        let mut mode = self.mode.write().await;
        *mode = match *mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        *mode
    }

    /// Log in and go to the dashboard.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email_or_username: &str, password: SecretString) -> AuthOutcome {
        let draft = match LoginDraft::new(email_or_username, password) {
            Ok(draft) => draft,
            Err(e) => return AuthOutcome::Message(e.to_string()),
        };

        match self.session.establish(&draft).await {
            Ok(_) => AuthOutcome::Navigate(Route::Dashboard),
            Err(e) => {
                e.report("login");
                AuthOutcome::Message(LOGIN_FAILED.to_string())
            }
        }
    }

    /// Create an account and switch to the login form.
    #[instrument(skip(self, email, password))]
    pub async fn register(&self, username: &str, email: &str, password: SecretString) -> AuthOutcome {
        let draft = match SignupDraft::new(username, email, password) {
            Ok(draft) => draft,
            Err(e) => return AuthOutcome::Message(e.to_string()),
        };

        match self.session.register(&draft).await {
            Ok(()) => {
                *self.mode.write().await = AuthMode::Login;
                AuthOutcome::Message(REGISTERED.to_string())
            }
            Err(e) => {
                e.report("register");
                let message = match e {
                    ClientError::Rejected { message, .. } => message,
                    _ => REGISTER_FAILED.to_string(),
                };
                AuthOutcome::Message(message)
            }
        }
    }
}
