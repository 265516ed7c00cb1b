//! Durable credential storage.
//!
//! The session keeps exactly one credential, stored under [`TOKEN_KEY`] in a
//! small key/value store so a restart can revalidate without prompting.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::debug;

/// The single well-known key the credential is stored under.
pub const TOKEN_KEY: &str = "token";

/// Credential storage failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt credential file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Key/value storage that survives a restart.
///
/// Implementations are blocking and expected to be fast (a local file or
/// memory); they are called directly from async code.
pub trait CredentialStore: Send + Sync {
    /// Read the stored credential, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be read.
    fn load(&self) -> Result<Option<SecretString>, StorageError>;

    /// Store `token`, replacing any previous credential.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be written.
    fn save(&self, token: &SecretString) -> Result<(), StorageError>;

    /// Remove the credential. Removing an absent credential succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be written.
    fn clear(&self) -> Result<(), StorageError>;
}

// =============================================================================
// File store
// =============================================================================

/// Credential store backed by a JSON object file.
///
/// Keys other than [`TOKEN_KEY`] are preserved on write.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_map(&self) -> Result<BTreeMap<String, serde_json::Value>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Write the map to a sibling temp file, then rename it into place.
    fn write_map(&self, map: &BTreeMap<String, serde_json::Value>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let contents = serde_json::to_vec_pretty(map).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let tmp = self.path.with_extension("tmp");
        let mut file = open_private(&tmp).map_err(|e| self.io_error(e))?;
        file.write_all(&contents).map_err(|e| self.io_error(e))?;
        file.sync_all().map_err(|e| self.io_error(e))?;
        drop(file);

        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::File::create(path)
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<SecretString>, StorageError> {
        let map = self.read_map()?;
        Ok(map
            .get(TOKEN_KEY)
            .and_then(serde_json::Value::as_str)
            .filter(|token| !token.is_empty())
            .map(SecretString::from))
    }

    fn save(&self, token: &SecretString) -> Result<(), StorageError> {
        // A corrupt file is replaced rather than blocking login.
        let mut map = self.read_map().unwrap_or_default();
        map.insert(
            TOKEN_KEY.to_string(),
            serde_json::Value::String(token.expose_secret().to_string()),
        );
        self.write_map(&map)?;
        debug!(path = %self.path.display(), "Credential saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let map = match self.read_map() {
            Ok(map) => map,
            Err(StorageError::Corrupt { .. }) => {
                return std::fs::remove_file(&self.path).map_err(|e| self.io_error(e));
            }
            Err(e) => return Err(e),
        };

        if !map.contains_key(TOKEN_KEY) {
            return Ok(());
        }

        let mut map = map;
        map.remove(TOKEN_KEY);
        self.write_map(&map)?;
        debug!(path = %self.path.display(), "Credential cleared");
        Ok(())
    }
}

// =============================================================================
// Memory store
// =============================================================================

/// In-process credential store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        store.entries().insert(TOKEN_KEY.to_string(), token.to_string());
        store
    }

    /// Whether a credential is currently stored.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.entries().contains_key(TOKEN_KEY)
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self
            .entries()
            .get(TOKEN_KEY)
            .map(|token| SecretString::from(token.as_str())))
    }

    fn save(&self, token: &SecretString) -> Result<(), StorageError> {
        self.entries()
            .insert(TOKEN_KEY.to_string(), token.expose_secret().to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.entries().remove(TOKEN_KEY);
        Ok(())
    }
}
