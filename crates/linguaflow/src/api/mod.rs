//! REST surface of the translation backend.

mod client;
pub mod detail;
mod types;

pub use client::ApiClient;
pub use types::{
    ContributionRequest, Credentials, HistoryItem, MessageResponse, Rating, RatingRequest,
    Registration, SavedTranslation, SavedTranslationKey, TokenResponse, TranslationRequest,
    TranslationResult,
};
