//! Persistent client configuration.

mod settings;

pub use settings::{API_URL_ENV_KEY, ClientSettings, DEFAULT_API_URL, Theme, parse_api_url};
