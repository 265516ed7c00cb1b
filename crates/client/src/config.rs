//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `WISHLIST_API_BASE_URL` - API root (default: `http://localhost:8080/api`)
//! - `WISHLIST_CREDENTIAL_PATH` - Where the login token is kept
//!   (default: `<data dir>/wishlist/credentials.json`)
//! - `WISHLIST_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//!
//! Empty values are treated as unset.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// API root used when `WISHLIST_API_BASE_URL` is not set.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

const DEFAULT_TIMEOUT_SECS: &str = "30";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Wishlist client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root URL every API path is appended to
    pub api_base_url: Url,
    /// File holding the durable credential
    pub credential_path: PathBuf,
    /// Per-request timeout enforced by the HTTP client
    pub request_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ClientConfig {
    /// Build a configuration with defaults for everything but the base URL.
    #[must_use]
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            credential_path: default_credential_path(),
            request_timeout: Duration::from_secs(30),
            sentry_dsn: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let raw_url = env.or_default("WISHLIST_API_BASE_URL", DEFAULT_API_BASE_URL);
        let api_base_url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("WISHLIST_API_BASE_URL".to_string(), e.to_string())
        })?;
        if !matches!(api_base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "WISHLIST_API_BASE_URL".to_string(),
                format!("unsupported scheme {}", api_base_url.scheme()),
            ));
        }

        let credential_path = env
            .optional("WISHLIST_CREDENTIAL_PATH")
            .map_or_else(default_credential_path, PathBuf::from);

        let timeout_secs = env
            .or_default("WISHLIST_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("WISHLIST_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "WISHLIST_HTTP_TIMEOUT_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            api_base_url,
            credential_path,
            request_timeout: Duration::from_secs(timeout_secs),
            sentry_dsn: env.optional("SENTRY_DSN"),
        })
    }
}

/// `<data dir>/wishlist/credentials.json`, or `./.wishlist/credentials.json`
/// when the platform has no data directory.
#[must_use]
pub fn default_credential_path() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from(".wishlist").join("credentials.json"),
        |dir| dir.join("wishlist").join("credentials.json"),
    )
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable; blank counts as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}
