//! Client library for the LinguaFlow translation service.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod lang;
pub mod paths;
pub mod render;
pub mod session;

pub use api::{ApiClient, HistoryItem, Rating, SavedTranslation, SavedTranslationKey};
pub use config::{ClientSettings, Theme};
pub use controller::{Controller, PanelState, PanelView, Prompt, View};
pub use error::ClientError;
pub use paths::{Layout, default_root};
pub use session::{Session, SessionStore};

// CLI module
#[path = "cli/i18n.rs"]
pub mod cli_i18n;
