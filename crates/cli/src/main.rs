//! Wishlist CLI - terminal front-end for the shared wishlist service.
//!
//! # Usage
//!
//! ```bash
//! # Create an account, then log in
//! wishlist signup alice alice@example.com
//! wishlist login alice
//!
//! # Work with wishlists
//! wishlist list
//! wishlist create "Birthday" -d "Things I'd like"
//! wishlist show 12
//! wishlist add-product 12 "Kettle" https://img.example/kettle.png 24.50
//! wishlist edit-product 12 7 --price 19.99
//! wishlist remove-product 12 7
//! wishlist invite 12 bob@example.com
//! wishlist delete 12 --yes
//! ```
//!
//! Every command first checks the saved login against the server. Passwords
//! are read from standard input.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wishlist_client::config::ClientConfig;

mod commands;

#[derive(Parser)]
#[command(name = "wishlist")]
#[command(author, version, about = "Shared wishlists from the terminal")]
struct Cli {
    /// Skip confirmation prompts for destructive commands
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Signup {
        username: String,
        email: String,
    },
    /// Log in with email or username
    Login { email_or_username: String },
    /// Forget the saved login
    Logout,
    /// Show who is logged in
    Whoami,
    /// List your wishlists
    List,
    /// Create a wishlist
    Create {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Delete a wishlist (owner only)
    Delete { id: String },
    /// Show a wishlist and its products
    Show { id: String },
    /// Add a product to a wishlist
    AddProduct {
        id: String,
        name: String,
        image_url: String,
        price: String,
    },
    /// Edit a product; omitted fields keep their current value
    EditProduct {
        id: String,
        product_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        price: Option<String>,
    },
    /// Remove a product from a wishlist
    RemoveProduct { id: String, product_id: String },
    /// Invite a collaborator by email (owner only)
    Invite { id: String, email: String },
}

/// Initialize Sentry error tracking if a DSN is configured.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "wishlist_client=info,wishlist_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = commands::App::start(config, cli.yes).await?;

    match cli.command {
        Commands::Signup { username, email } => app.signup(&username, &email).await?,
        Commands::Login { email_or_username } => app.login(&email_or_username).await?,
        Commands::Logout => app.logout().await,
        Commands::Whoami => app.whoami()?,
        Commands::List => app.list().await?,
        Commands::Create { title, description } => app.create(&title, &description).await?,
        Commands::Delete { id } => app.delete(&id).await?,
        Commands::Show { id } => app.show(&id).await?,
        Commands::AddProduct {
            id,
            name,
            image_url,
            price,
        } => app.add_product(&id, &name, &image_url, &price).await?,
        Commands::EditProduct {
            id,
            product_id,
            name,
            image_url,
            price,
        } => {
            let changes = commands::ProductChanges {
                name,
                image_url,
                price,
            };
            app.edit_product(&id, &product_id, changes).await?;
        }
        Commands::RemoveProduct { id, product_id } => app.remove_product(&id, &product_id).await?,
        Commands::Invite { id, email } => app.invite(&id, &email).await?,
    }
    Ok(())
}
