use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use toml_edit::{de::Error as TomlDeError, ser::Error as TomlSerError};
use url::ParseError as UrlParseError;

/// Action attempted without a session token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardedAction {
    Save,
    Rate,
    Suggest,
    Delete,
    History,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection error talking to {url}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed with HTTP {status}: {detail}")]
    Api { url: String, status: u16, detail: String },

    #[error("unexpected response body from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("session expired")]
    SessionExpired,

    #[error("login required")]
    LoginRequired { action: GuardedAction },

    #[error("no access token for {url}")]
    MissingToken { url: String },

    #[error("history item {id} not found")]
    HistoryItemNotFound { id: i64 },

    #[error("invalid API url '{url}'")]
    InvalidApiUrl {
        url: String,
        #[source]
        source: UrlParseError,
    },

    #[error("API url '{url}' must use http or https")]
    UnsupportedApiScheme { url: String },

    #[error("failed to build HTTP client")]
    HttpClient {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to create directory {path}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove {path}")]
    RemoveFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse settings file {path}")]
    ParseSettings {
        path: PathBuf,
        #[source]
        source: TomlDeError,
    },

    #[error("failed to parse state file {path}")]
    ParseState {
        path: PathBuf,
        #[source]
        source: TomlDeError,
    },

    #[error("failed to serialise TOML document")]
    SerialiseToml {
        #[source]
        source: TomlSerError,
    },

    #[error("unable to determine user home directory for LINGUAFLOW_ROOT")]
    HomeDirectoryUnknown,
}

impl ClientError {
    /// True for the backend's stale-token signal.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired)
    }

    pub fn message_key(&self) -> &'static str {
        match self {
            ClientError::Network { .. } => "client.network",
            ClientError::Api { .. } => "client.api_error",
            ClientError::Decode { .. } => "client.decode",
            ClientError::SessionExpired => "client.session_expired",
            ClientError::LoginRequired { action } => match action {
                GuardedAction::Save => "client.login_required.save",
                GuardedAction::Rate => "client.login_required.rate",
                GuardedAction::Suggest => "client.login_required.suggest",
                GuardedAction::Delete => "client.login_required.delete",
                GuardedAction::History => "client.login_required.history",
            },
            ClientError::MissingToken { .. } => "client.missing_token",
            ClientError::HistoryItemNotFound { .. } => "client.history_item_not_found",
            ClientError::InvalidApiUrl { .. } => "client.invalid_api_url",
            ClientError::UnsupportedApiScheme { .. } => "client.unsupported_api_scheme",
            ClientError::HttpClient { .. } => "client.http_client",
            ClientError::CreateDirectory { .. } => "core.create_dir_failed",
            ClientError::ReadFile { .. } => "core.read_file_failed",
            ClientError::WriteFile { .. } => "core.write_file_failed",
            ClientError::RemoveFile { .. } => "core.remove_file_failed",
            ClientError::ParseSettings { .. } => "core.parse_settings_failed",
            ClientError::ParseState { .. } => "core.parse_state_failed",
            ClientError::SerialiseToml { .. } => "core.serialise_toml_failed",
            ClientError::HomeDirectoryUnknown => "core.home_dir_unknown",
        }
    }

    pub fn placeholders(&self) -> Vec<(&'static str, String)> {
        match self {
            ClientError::Network { url, source } | ClientError::Decode { url, source } => {
                vec![("url", url.clone()), ("error", source.to_string())]
            }
            ClientError::Api { url, status, detail } => vec![
                ("url", url.clone()),
                ("status", status.to_string()),
                ("detail", detail.clone()),
            ],
            ClientError::SessionExpired | ClientError::LoginRequired { .. } => Vec::new(),
            ClientError::HistoryItemNotFound { id } => vec![("id", id.to_string())],
            ClientError::InvalidApiUrl { url, source } => {
                vec![("url", url.clone()), ("error", source.to_string())]
            }
            ClientError::UnsupportedApiScheme { url } | ClientError::MissingToken { url } => {
                vec![("url", url.clone())]
            }
            ClientError::HttpClient { source } => vec![("error", source.to_string())],
            ClientError::CreateDirectory { path, source }
            | ClientError::ReadFile { path, source }
            | ClientError::WriteFile { path, source }
            | ClientError::RemoveFile { path, source } => {
                vec![("path", display_path(path)), ("error", source.to_string())]
            }
            ClientError::ParseSettings { path, source }
            | ClientError::ParseState { path, source } => {
                vec![("path", display_path(path)), ("error", source.to_string())]
            }
            ClientError::SerialiseToml { source } => vec![("error", source.to_string())],
            ClientError::HomeDirectoryUnknown => Vec::new(),
        }
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_required_keys_follow_action() {
        let err = ClientError::LoginRequired { action: GuardedAction::Rate };
        assert_eq!(err.message_key(), "client.login_required.rate");
        assert!(err.placeholders().is_empty());
    }

    #[test]
    fn api_error_exposes_detail_placeholder() {
        let err = ClientError::Api {
            url: "http://127.0.0.1:8000/login".into(),
            status: 401,
            detail: "Incorrect username or password".into(),
        };
        let placeholders = err.placeholders();
        assert!(placeholders.contains(&("status", "401".to_string())));
        assert!(placeholders.contains(&("detail", "Incorrect username or password".to_string())));
    }
}
