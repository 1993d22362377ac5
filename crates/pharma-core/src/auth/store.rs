//! Persisted session storage.
//!
//! Holds three keys: the access token, the refresh token and the serialized
//! identity. The file store writes `<PHARMA_HOME>/session.json` with restricted
//! permissions (0600). Tokens are never logged in full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::identity::UserIdentity;
use crate::config::paths;

/// Session snapshot as written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub user: UserIdentity,
}

/// On-disk shape. Every key is optional so partial files can be detected
/// instead of failing to parse.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSession {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<serde_json::Value>,
}

impl RawSession {
    /// A session is usable only if both the token and a well-formed identity are present.
    fn into_session(self) -> Option<PersistedSession> {
        let access_token = self.access_token.filter(|t| !t.trim().is_empty())?;
        let user: UserIdentity = serde_json::from_value(self.user?).ok()?;
        Some(PersistedSession {
            access_token,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            user,
        })
    }
}

/// Synchronous key-value storage for the active session.
pub trait SessionStore: Send + Sync {
    /// Reads the persisted session. `Ok(None)` means nothing usable is stored.
    ///
    /// # Errors
    /// Returns an error if the underlying storage cannot be read.
    fn load(&self) -> Result<Option<PersistedSession>>;

    /// Replaces the persisted session.
    ///
    /// # Errors
    /// Returns an error if the session cannot be written.
    fn save(&self, session: &PersistedSession) -> Result<()>;

    /// Removes every persisted key. Clearing an empty store succeeds.
    ///
    /// # Errors
    /// Returns an error if existing data cannot be removed.
    fn clear(&self) -> Result<()>;
}

/// File-backed store (JSON, mode 0600 on unix).
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default `<PHARMA_HOME>/session.json`.
    pub fn default_location() -> Self {
        Self::new(paths::session_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<PersistedSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session from {}", self.path.display()))?;

        match serde_json::from_str::<RawSession>(&contents) {
            Ok(raw) => Ok(raw.into_session()),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Ignoring unreadable persisted session"
                );
                Ok(None)
            }
        }
    }

    fn save(&self, session: &PersistedSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(session).context("Failed to serialize session")?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options
            .open(&self.path)
            .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
        #[cfg(unix)]
        {
            // mode() only applies on create
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to restrict {}", self.path.display()))?;
        }
        file.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write to {}", self.path.display()))?;

        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}

/// In-process store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<PersistedSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a session.
    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &PersistedSession) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
