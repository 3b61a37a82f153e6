//! Session context and session persistence.
//!
//! `SessionContext` is the single explicit holder of "who is signed in". It is
//! created once at startup, filled by the auth flow, read by the data façade
//! for bearer tokens, and cleared on sign-out.
//!
//! `SessionStore` keeps the session in `<base>/session.json` with restricted
//! permissions (0600) so a later launch can restore it. Tokens are never logged
//! or displayed in full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::{AuthSession, RemoteUser};
use crate::config::paths;
use crate::models::AccessLevel;

/// Username used when neither metadata nor email yield one.
pub const UNKNOWN_USERNAME: &str = "Unknown";

/// Normalized signed-in user handed to the rest of the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub access_level: AccessLevel,
    pub authenticated: bool,
}

impl AuthUser {
    /// Normalizes an auth-service user.
    ///
    /// Username: metadata `username`, else the email local part, else
    /// `"Unknown"`. Access level: metadata `access_level`, else guest.
    pub fn from_remote(user: &RemoteUser) -> Self {
        let email = user.email.clone().unwrap_or_default();
        let username = user
            .metadata_str("username")
            .map(str::to_string)
            .or_else(|| {
                email
                    .split('@')
                    .next()
                    .map(str::trim)
                    .filter(|local| !local.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| UNKNOWN_USERNAME.to_string());
        let access_level = user
            .metadata_str("access_level")
            .and_then(AccessLevel::parse)
            .unwrap_or_default();

        Self {
            id: user.id,
            username,
            email,
            access_level,
            authenticated: true,
        }
    }
}

/// Tokens plus the normalized user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry in unix seconds, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl Session {
    pub fn from_auth(session: &AuthSession) -> Self {
        let expires_at = session.expires_at.or_else(|| {
            session
                .expires_in
                .map(|secs| Utc::now().timestamp().saturating_add(secs))
        });
        Self {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_at,
            user: AuthUser::from_remote(&session.user),
        }
    }

    /// Returns true if the access token is past its known expiry.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires| Utc::now().timestamp() >= expires)
    }
}

/// Shared handle to the current session.
///
/// Cloning yields another handle to the same session.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, session: Session) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn current(&self) -> Option<Session> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.current().map(|session| session.user)
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// On-disk session persistence.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(paths::session_path())
    }
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored session.
    /// Returns `None` if the file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session from {}", self.path.display()))?;
        let session = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", self.path.display()))?;
        Ok(Some(session))
    }

    /// Saves the session with restricted permissions (0600).
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(session).context("Failed to serialize session")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }

    /// Removes the stored session. Returns whether one existed.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        Ok(true)
    }
}

/// Returns a masked version of a token for display (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 16 || !token.is_char_boundary(12) {
        return "***".to_string();
    }
    format!("{}...", &token[..12])
}
