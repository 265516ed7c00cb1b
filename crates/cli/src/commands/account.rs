//! Account commands: signup, login, logout, whoami.

use wishlist_client::controllers::{AuthMode, AuthOutcome};
use wishlist_client::session::SessionStatus;

use super::{App, CliError, prompt_password};

impl App {
    pub async fn signup(&self, username: &str, email: &str) -> Result<(), CliError> {
        let password = prompt_password()?;
        let flow = self.state.auth_flow();
        flow.toggle_mode().await;

        let AuthOutcome::Message(message) = flow.register(username, email, password).await else {
            return Ok(());
        };
        if flow.mode().await == AuthMode::Login {
            println!("{message}");
            Ok(())
        } else {
            Err(CliError::Action(message))
        }
    }

    pub async fn login(&self, email_or_username: &str) -> Result<(), CliError> {
        let password = prompt_password()?;
        match self.state.auth_flow().login(email_or_username, password).await {
            AuthOutcome::Navigate(_) => {
                if let Some(identity) = self.state.session().identity().await {
                    println!("Logged in as {} <{}>.", identity.username, identity.email);
                }
                Ok(())
            }
            AuthOutcome::Message(message) => Err(CliError::Action(message)),
        }
    }

    pub async fn logout(&self) {
        self.state.session().terminate().await;
        println!("Logged out.");
    }

    pub fn whoami(&self) -> Result<(), CliError> {
        match &self.status {
            SessionStatus::Authenticated(identity) => {
                println!("{} <{}> (id {})", identity.username, identity.email, identity.id);
                Ok(())
            }
            SessionStatus::Pending | SessionStatus::Unauthenticated => Err(CliError::NotLoggedIn),
        }
    }
}
