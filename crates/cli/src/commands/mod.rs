//! Command implementations.
//!
//! Each command is a short script over the client controllers: check the
//! session, run one controller action, print the resulting view.

mod account;
mod wishlists;

use std::io::{BufRead, Write};

use secrecy::SecretString;
use thiserror::Error;
use wishlist_client::api::TransportError;
use wishlist_client::config::ClientConfig;
use wishlist_client::controllers::{ActionOutcome, Confirm};
use wishlist_client::routes::{Route, RouteDecision};
use wishlist_client::session::SessionStatus;
use wishlist_client::AppState;

pub use wishlists::ProductChanges;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The command needs a login.
    #[error("Not logged in. Run `wishlist login` first.")]
    NotLoggedIn,

    /// The action failed; the message is already user-facing.
    #[error("{0}")]
    Action(String),

    /// Reading from the terminal failed.
    #[error("Input error: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP client could not be set up.
    #[error("Could not set up HTTP client: {0}")]
    Transport(#[from] TransportError),
}

/// Asks on the terminal, or always agrees with `--yes`.
struct Console {
    assume_yes: bool,
}

impl Confirm for Console {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let Ok(answer) = prompt_line(&format!("{prompt} [y/N] ")) else {
            return false;
        };
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// A started CLI session: shared state plus the result of the login check.
pub struct App {
    state: AppState,
    status: SessionStatus,
    console: Console,
}

impl App {
    /// Build the client and check the saved login.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Transport`] if the HTTP client cannot be built.
    pub async fn start(config: &ClientConfig, assume_yes: bool) -> Result<Self, CliError> {
        let state = AppState::from_config(config)?;
        let status = state.session().revalidate().await;
        Ok(Self {
            state,
            status,
            console: Console { assume_yes },
        })
    }

    /// Gate a command behind the route table.
    fn open(&self, route: &Route) -> Result<(), CliError> {
        match Route::resolve(&route.path(), &self.status) {
            RouteDecision::Render(_) => Ok(()),
            RouteDecision::Redirect(_) | RouteDecision::Loading => Err(CliError::NotLoggedIn),
        }
    }
}

/// Turn a controller outcome into the command's result.
fn settle(outcome: ActionOutcome) -> Result<(), CliError> {
    match outcome {
        ActionOutcome::Applied | ActionOutcome::Stale => Ok(()),
        ActionOutcome::Declined => {
            println!("Cancelled.");
            Ok(())
        }
        ActionOutcome::Invalid(e) => Err(CliError::Action(e.to_string())),
        ActionOutcome::Failed(message) => Err(CliError::Action(message)),
        ActionOutcome::Navigate(Route::Login) => Err(CliError::NotLoggedIn),
        ActionOutcome::Navigate(_) => Ok(()),
    }
}

fn prompt_line(prompt: &str) -> std::io::Result<String> {
    let mut stderr = std::io::stderr();
    stderr.write_all(prompt.as_bytes())?;
    stderr.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn prompt_password() -> std::io::Result<SecretString> {
    prompt_line("Password: ").map(SecretString::from)
}
