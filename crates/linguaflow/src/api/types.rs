use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Body of `POST /register`.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// Token issued by `/login` and `/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslationResult {
    pub translated: String,
    #[serde(default)]
    pub original: Option<String>,
}

/// Thumbs-up/thumbs-down feedback. The backend stores it as a 1..=5 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Rating {
    Dislike,
    Like,
}

impl Rating {
    pub fn score(self) -> u8 {
        match self {
            Rating::Dislike => 1,
            Rating::Like => 5,
        }
    }

    pub fn from_score(score: i64) -> Option<Self> {
        match score {
            1 => Some(Rating::Dislike),
            5 => Some(Rating::Like),
            _ => None,
        }
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.score()
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::from_score(i64::from(value)).ok_or_else(|| format!("unsupported rating {value}"))
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Dislike => f.write_str("dislike"),
            Rating::Like => f.write_str("like"),
        }
    }
}

/// Scores other than 1 and 5 carry no like/dislike meaning and read as unset.
fn lenient_rating<'de, D>(deserializer: D) -> Result<Option<Rating>, D::Error>
where
    D: Deserializer<'de>,
{
    let score = Option::<i64>::deserialize(deserializer)?;
    Ok(score.and_then(Rating::from_score))
}

/// Identity of a translation for save/unsave.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SavedTranslationKey {
    pub original_text: String,
    pub translated_text: String,
    pub source_lang: String,
    pub target_lang: String,
}

/// One row of `GET /history`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryItem {
    pub id: i64,
    pub original_text: String,
    pub translated_text: String,
    #[serde(default)]
    pub source_lang: String,
    #[serde(default)]
    pub target_lang: String,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub suggestion: Option<String>,
    /// Saved flag computed by the server, when it sends one.
    #[serde(default)]
    pub is_saved: Option<bool>,
    #[serde(default)]
    pub created_at: String,
}

/// One row of `GET /saved-translations`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SavedTranslation {
    pub id: i64,
    pub original_text: String,
    pub translated_text: String,
    #[serde(default)]
    pub source_lang: String,
    #[serde(default)]
    pub target_lang: String,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

/// Body of `POST /rate` and `POST /rate/undo`.
#[derive(Debug, Clone, Serialize)]
pub struct RatingRequest {
    pub original_text: String,
    pub translated_text: String,
    pub rating: Rating,
}

/// Body of `POST /contribute`.
#[derive(Debug, Clone, Serialize)]
pub struct ContributionRequest {
    pub original_text: String,
    pub suggested_translation: String,
    pub source_lang: String,
    pub target_lang: String,
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

impl MessageResponse {
    /// The message, unless the server sent nothing useful.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().map(str::trim).filter(|message| !message.is_empty())
    }
}
