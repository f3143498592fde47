use std::{env, fmt, fs, path::Path, str::FromStr};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{error::ClientError, lang};

/// Backend address used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
/// Environment variable that overrides the configured backend address.
pub const API_URL_ENV_KEY: &str = "LINGUAFLOW_API_URL";

/// Colour theme preference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

/// User-level client settings persisted in `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientSettings {
    /// Base URL of the translation backend.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub theme: Theme,
    /// Language selected in the source box on a fresh start.
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    /// Language selected in the target box on a fresh start.
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            theme: Theme::default(),
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_source_lang() -> String {
    lang::ENGLISH.to_string()
}

fn default_target_lang() -> String {
    lang::VIETNAMESE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsDocument {
    #[serde(default)]
    client: Option<ClientSettings>,
}

impl ClientSettings {
    /// Load settings from disk, falling back to defaults when the file is absent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let settings = Self::read(path)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Like [`ClientSettings::load`] but keeps an invalid `api_url`, so it can be repaired.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|source| ClientError::ReadFile { path: path.to_path_buf(), source })?;
        let doc: SettingsDocument = toml_edit::de::from_str(&content)
            .map_err(|source| ClientError::ParseSettings { path: path.to_path_buf(), source })?;
        let mut settings = doc.client.unwrap_or_default();
        settings.api_url = settings.api_url.trim().to_string();
        Ok(settings)
    }

    /// Persist settings to disk.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.validate()?;
        let toml = self.to_toml_string()?;
        fs::write(path, toml)
            .map_err(|source| ClientError::WriteFile { path: path.to_path_buf(), source })?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        let doc = SettingsDocument { client: Some(self.clone()) };
        toml_edit::ser::to_string_pretty(&doc)
            .map_err(|source| ClientError::SerialiseToml { source }.into())
    }

    pub fn validate(&self) -> Result<()> {
        parse_api_url(&self.api_url)?;
        Ok(())
    }

    /// Effective backend URL: explicit override, then environment, then the file value.
    pub fn resolve_api_url(&self, override_url: Option<&str>) -> Result<Url> {
        let from_env = env::var(API_URL_ENV_KEY).ok();
        self.resolve_api_url_with(override_url, from_env.as_deref())
    }

    fn resolve_api_url_with(
        &self,
        override_url: Option<&str>,
        from_env: Option<&str>,
    ) -> Result<Url> {
        let candidate = [override_url, from_env]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|value| !value.is_empty())
            .unwrap_or(self.api_url.as_str());
        parse_api_url(candidate)
    }
}

/// Parse and check a backend base URL.
pub fn parse_api_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|source| ClientError::InvalidApiUrl { url: trimmed.to_string(), source })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::UnsupportedApiScheme { url: trimmed.to_string() }.into());
    }
    Ok(url)
}
