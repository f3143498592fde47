//! Filesystem layout helpers for the LinguaFlow client.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::Result;

use crate::error::ClientError;

/// Environment variable that overrides the default root directory.
const ROOT_ENV_KEY: &str = "LINGUAFLOW_ROOT";
const DEFAULT_ROOT_DIRNAME: &str = ".linguaflow";

/// Descriptor for the on-disk directory structure.
#[derive(Clone, Debug)]
pub struct Layout {
    root: PathBuf,
    state_dir: PathBuf,
    logs_dir: PathBuf,
}

impl Layout {
    /// Construct a new layout without touching the filesystem.
    pub fn new(root: PathBuf) -> Self {
        let state_dir = root.join("state");
        let logs_dir = root.join("logs");

        Self { root, state_dir, logs_dir }
    }

    /// Ensure that all directories exist on disk.
    pub fn ensure(&self) -> Result<()> {
        for dir in [self.root(), self.state_dir(), self.logs_dir()] {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|source| ClientError::CreateDirectory {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
        }
        Ok(())
    }

    /// Root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the session token and translate box state.
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Directory for the client's rolling log files.
    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Path to the settings file.
    pub fn settings_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Path to the persisted access token.
    pub fn session_path(&self) -> PathBuf {
        self.state_dir.join("session.toml")
    }

    /// Path to the persisted translate box.
    pub fn panel_path(&self) -> PathBuf {
        self.state_dir.join("panel.toml")
    }
}

/// Determine the default root directory for the client.
pub fn default_root() -> Result<PathBuf> {
    if let Ok(value) = env::var(ROOT_ENV_KEY) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }

    let home = user_home_dir().ok_or(ClientError::HomeDirectoryUnknown)?;
    Ok(home.join(DEFAULT_ROOT_DIRNAME))
}

/// Expand a leading `~` against the user's home directory.
pub fn expand_tilde(path: PathBuf) -> Result<PathBuf> {
    if let Some(str_path) = path.to_str() {
        if let Some(stripped) = str_path.strip_prefix('~') {
            let home = user_home_dir().ok_or(ClientError::HomeDirectoryUnknown)?;
            if stripped.is_empty() {
                return Ok(home);
            }
            let stripped = stripped.strip_prefix('/').unwrap_or(stripped);
            return Ok(home.join(stripped));
        }
    }
    Ok(path)
}

fn user_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    None
}
