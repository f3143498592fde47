//! Bearer token handling.
//!
//! The token is opaque to the client. Holding one is enough to act as a logged-in
//! user; the backend decides whether it is still valid and answers `401` otherwise.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::ClientError, paths::Layout};

/// Session context passed to every request-issuing function.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    /// Guest session without credentials.
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            Self::anonymous()
        } else {
            Self { token: Some(trimmed.to_string()) }
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {token}"))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("authenticated", &self.is_authenticated()).finish()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionDocument {
    #[serde(rename = "accessToken", default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
}

/// File-backed token storage.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(layout: &Layout) -> Self {
        Self { path: layout.session_path() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Session> {
        if !self.path.exists() {
            return Ok(Session::anonymous());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|source| ClientError::ReadFile { path: self.path.clone(), source })?;
        let doc: SessionDocument = toml_edit::de::from_str(&content)
            .map_err(|source| ClientError::ParseState { path: self.path.clone(), source })?;
        Ok(doc.access_token.map(Session::with_token).unwrap_or_default())
    }

    /// Persist the session; an anonymous session removes the stored token.
    pub fn store(&self, session: &Session) -> Result<()> {
        let Some(token) = session.token() else {
            return self.clear();
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ClientError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let doc = SessionDocument { access_token: Some(token.to_string()) };
        let toml = toml_edit::ser::to_string_pretty(&doc)
            .map_err(|source| ClientError::SerialiseToml { source })?;
        fs::write(&self.path, toml)
            .map_err(|source| ClientError::WriteFile { path: self.path.clone(), source })?;
        restrict_permissions(&self.path)?;
        debug!(path = %self.path.display(), "stored access token");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .map_err(|source| ClientError::RemoveFile { path: self.path.clone(), source })?;
            debug!(path = %self.path.display(), "removed access token");
        }
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt as _;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|source| ClientError::WriteFile { path: path.to_path_buf(), source })?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
