use std::{fs, path::Path};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{api::Rating, config::ClientSettings, error::ClientError, lang::LanguagePair};

/// Navigation target after session changes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Login/register screen.
    #[default]
    Entry,
    /// Main translate screen, either logged in or as a guest.
    Translate,
}

/// Indicators attached to the translation currently in the translate box.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemStatus {
    #[serde(default)]
    pub saved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub suggested: bool,
}

/// Translate box contents, persisted between invocations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PanelState {
    #[serde(default)]
    pub view: View,
    pub source_lang: String,
    pub target_lang: String,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub status: ItemStatus,
}

impl PanelState {
    pub fn new(settings: &ClientSettings) -> Self {
        let pair = LanguagePair::new(&settings.source_lang, &settings.target_lang);
        Self {
            view: View::default(),
            source_lang: pair.source,
            target_lang: pair.target,
            input: String::new(),
            output: String::new(),
            status: ItemStatus::default(),
        }
    }

    pub fn load(path: &Path, settings: &ClientSettings) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new(settings));
        }
        let content = fs::read_to_string(path)
            .map_err(|source| ClientError::ReadFile { path: path.to_path_buf(), source })?;
        let state = toml_edit::de::from_str(&content)
            .map_err(|source| ClientError::ParseState { path: path.to_path_buf(), source })?;
        Ok(state)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ClientError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let toml = toml_edit::ser::to_string_pretty(self)
            .map_err(|source| ClientError::SerialiseToml { source })?;
        fs::write(path, toml)
            .map_err(|source| ClientError::WriteFile { path: path.to_path_buf(), source })?;
        Ok(())
    }

    pub fn languages(&self) -> LanguagePair {
        LanguagePair { source: self.source_lang.clone(), target: self.target_lang.clone() }
    }

    pub fn set_languages(&mut self, pair: LanguagePair) {
        self.source_lang = pair.source;
        self.target_lang = pair.target;
    }

    /// Empty the translate box and drop its indicators; the language pair stays.
    pub fn clear_translation(&mut self) {
        self.input.clear();
        self.output.clear();
        self.status = ItemStatus::default();
    }

    /// True once both sides of the translate box hold text.
    pub fn has_translation(&self) -> bool {
        !self.input.is_empty() && !self.output.is_empty()
    }
}
