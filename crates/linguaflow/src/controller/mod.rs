//! View controller: session handling, the translate box and the list panels.
//!
//! Every request-issuing method takes the session from the controller and passes
//! it to [`ApiClient`] explicitly. A `401` on an authenticated call logs the user
//! out before the error is returned.

mod prompt;
mod state;

use std::{collections::HashSet, path::PathBuf};

use anyhow::Result;
use tracing::{debug, info, warn};

pub use prompt::{Confirmation, FixedAnswer, Prompt};
pub use state::{ItemStatus, PanelState, View};

use crate::{
    api::{
        ApiClient, ContributionRequest, Credentials, HistoryItem, MessageResponse, Rating,
        RatingRequest, Registration, SavedTranslation, SavedTranslationKey, TokenResponse,
        TranslationRequest,
    },
    config::ClientSettings,
    error::{ClientError, GuardedAction},
    paths::Layout,
    session::{Session, SessionStore},
};

/// Result of a panel fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelView<T> {
    /// No token; nothing was fetched.
    LoginRequired,
    Items(Vec<T>),
}

/// A history row with its resolved saved flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub item: HistoryItem,
    pub saved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateOutcome {
    /// Blank input; no request was sent.
    Empty,
    Translated {
        translated: String,
        /// Reloaded history, for logged-in users.
        history: Option<Vec<HistoryItem>>,
    },
    /// The error text now shown in the output area.
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    NothingToSave,
    Saved(SavedTranslation),
    Unsaved { message: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateOutcome {
    NothingToRate,
    Rated { rating: Rating, message: Option<String> },
    Cleared { rating: Rating },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestOutcome {
    NothingToSuggest,
    Cancelled,
    Submitted { message: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    Deleted {
        message: Option<String>,
        history: Vec<HistoryEntry>,
        saved: Vec<SavedTranslation>,
    },
}

pub struct Controller {
    api: ApiClient,
    sessions: SessionStore,
    session: Session,
    panel_path: PathBuf,
    panel: PanelState,
}

impl Controller {
    /// Build a controller against the configured backend.
    pub fn open(layout: &Layout, settings: &ClientSettings, api_url: Option<&str>) -> Result<Self> {
        let base_url = settings.resolve_api_url(api_url)?;
        let api = ApiClient::new(base_url)?;
        Self::with_client(api, layout, settings)
    }

    pub fn with_client(api: ApiClient, layout: &Layout, settings: &ClientSettings) -> Result<Self> {
        let sessions = SessionStore::new(layout);
        let session = sessions.load()?;
        let panel_path = layout.panel_path();
        let mut panel = PanelState::load(&panel_path, settings)?;
        if session.is_authenticated() {
            panel.view = View::Translate;
        }
        debug!(api = %api.base_url(), authenticated = session.is_authenticated(), "controller ready");
        Ok(Self { api, sessions, session, panel_path, panel })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn view(&self) -> View {
        self.panel.view
    }

    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    // ----- session -----

    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let credentials =
            Credentials { username: username.to_string(), password: password.to_string() };
        let token = self.api.login(&credentials).await?;
        self.establish(token)?;
        info!(username, "logged in");
        Ok(())
    }

    /// Create an account; the returned token logs the user in straight away.
    pub async fn register(
        &mut self,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<()> {
        let registration = Registration {
            username: username.to_string(),
            password: password.to_string(),
            confirm_password: confirm_password.to_string(),
        };
        let token = self.api.register(&registration).await?;
        self.establish(token)?;
        info!(username, "registered");
        Ok(())
    }

    pub fn continue_as_guest(&mut self) -> Result<()> {
        self.session = Session::anonymous();
        self.sessions.clear()?;
        self.panel.view = View::Translate;
        self.panel.clear_translation();
        self.persist()?;
        info!("continuing as guest");
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        self.session = Session::anonymous();
        self.sessions.clear()?;
        self.panel.view = View::Entry;
        self.panel.clear_translation();
        self.persist()?;
        info!("logged out");
        Ok(())
    }

    fn establish(&mut self, token: TokenResponse) -> Result<()> {
        self.session = Session::with_token(token.access_token);
        self.sessions.store(&self.session)?;
        self.panel.view = View::Translate;
        self.panel.clear_translation();
        self.persist()
    }

    // ----- translate box -----

    pub fn set_source_lang(&mut self, code: &str) -> Result<()> {
        let mut pair = self.panel.languages();
        pair.set_source(code);
        self.panel.set_languages(pair);
        self.persist()
    }

    pub fn set_target_lang(&mut self, code: &str) -> Result<()> {
        let mut pair = self.panel.languages();
        pair.set_target(code);
        self.panel.set_languages(pair);
        self.persist()
    }

    /// Translate `text` with the selected languages.
    ///
    /// Backend and network failures are written to the output area and reported
    /// as [`TranslateOutcome::Failed`] rather than returned as errors.
    pub async fn translate(&mut self, text: &str) -> Result<TranslateOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(TranslateOutcome::Empty);
        }

        self.panel.input = text.to_string();
        self.panel.output.clear();
        self.panel.status = ItemStatus::default();

        let request = TranslationRequest {
            text: text.to_string(),
            source_lang: self.panel.source_lang.clone(),
            target_lang: self.panel.target_lang.clone(),
        };
        info!(source = %request.source_lang, target = %request.target_lang, "translating");
        let result = self.api.translate(&self.session, &request).await;
        debug!(ok = result.is_ok(), "translation finished");

        let translated = match result {
            Ok(result) => result.translated,
            Err(err) => {
                warn!(error = %err, "translation failed");
                let message = inline_error(&err);
                self.panel.output = message.clone();
                self.persist()?;
                return Ok(TranslateOutcome::Failed { message });
            }
        };
        self.panel.output = translated.clone();
        self.persist()?;

        let history = if self.is_authenticated() {
            match self.history(None).await {
                Ok(PanelView::Items(items)) => Some(items),
                Ok(PanelView::LoginRequired) => None,
                Err(err) => {
                    warn!(error = %err, "failed to reload history");
                    None
                }
            }
        } else {
            None
        };
        Ok(TranslateOutcome::Translated { translated, history })
    }

    /// Save the current translation, or unsave it when it is already saved.
    pub async fn toggle_save(&mut self) -> Result<SaveOutcome> {
        self.require_login(GuardedAction::Save)?;
        let Some(key) = self.current_key() else {
            return Ok(SaveOutcome::NothingToSave);
        };

        if self.panel.status.saved {
            let result = self.api.unsave_translation(&self.session, &key).await;
            let response = self.check(result)?;
            self.panel.status.saved = false;
            self.persist()?;
            info!("translation unsaved");
            Ok(SaveOutcome::Unsaved { message: message_of(&response) })
        } else {
            let result = self.api.save_translation(&self.session, &key).await;
            let saved = self.check(result)?;
            self.panel.status.saved = true;
            self.persist()?;
            info!(id = saved.id, "translation saved");
            Ok(SaveOutcome::Saved(saved))
        }
    }

    /// Apply `rating`; choosing the active rating again clears it.
    pub async fn rate(&mut self, rating: Rating) -> Result<RateOutcome> {
        self.require_login(GuardedAction::Rate)?;
        if !self.panel.has_translation() {
            return Ok(RateOutcome::NothingToRate);
        }

        let request = RatingRequest {
            original_text: self.panel.input.clone(),
            translated_text: self.panel.output.clone(),
            rating,
        };
        if self.panel.status.rating == Some(rating) {
            let result = self.api.undo_rating(&self.session, &request).await;
            self.check(result)?;
            self.panel.status.rating = None;
            self.persist()?;
            info!(%rating, "rating cleared");
            Ok(RateOutcome::Cleared { rating })
        } else {
            let result = self.api.rate(&self.session, &request).await;
            let response = self.check(result)?;
            self.panel.status.rating = Some(rating);
            self.persist()?;
            info!(%rating, "rating applied");
            Ok(RateOutcome::Rated { rating, message: message_of(&response) })
        }
    }

    /// Submit an alternative translation; an empty suggestion cancels.
    pub async fn suggest(&mut self, suggestion: &str) -> Result<SuggestOutcome> {
        self.require_login(GuardedAction::Suggest)?;
        if self.panel.input.is_empty() {
            return Ok(SuggestOutcome::NothingToSuggest);
        }
        if suggestion.trim().is_empty() {
            return Ok(SuggestOutcome::Cancelled);
        }

        let request = ContributionRequest {
            original_text: self.panel.input.clone(),
            suggested_translation: suggestion.to_string(),
            source_lang: self.panel.source_lang.clone(),
            target_lang: self.panel.target_lang.clone(),
        };
        let result = self.api.contribute(&self.session, &request).await;
        let response = self.check(result)?;
        self.panel.status.suggested = true;
        self.persist()?;
        info!("suggestion submitted");
        Ok(SuggestOutcome::Submitted { message: message_of(&response) })
    }

    /// Copy a history item into the translate box and sync its indicators.
    pub async fn fill_from_history(&mut self, id: i64) -> Result<HistoryItem> {
        self.require_login(GuardedAction::History)?;
        let result = self.api.history(&self.session, None).await;
        let history = self.check(result)?;
        let item = history
            .into_iter()
            .find(|item| item.id == id)
            .ok_or(ClientError::HistoryItemNotFound { id })?;

        let saved = match item.is_saved {
            Some(saved) => saved,
            None => {
                let result = self.api.saved_translations(&self.session, None).await;
                let saved = self.saved_or_empty(result);
                saved.iter().any(|entry| entry.original_text == item.original_text)
            }
        };

        self.panel.input = item.original_text.clone();
        self.panel.output = item.translated_text.clone();
        if !item.source_lang.is_empty() {
            self.panel.source_lang = item.source_lang.clone();
        }
        if !item.target_lang.is_empty() {
            self.panel.target_lang = item.target_lang.clone();
        }
        self.panel.status = ItemStatus {
            saved,
            rating: item.rating,
            suggested: item.suggestion.as_deref().is_some_and(|s| !s.is_empty()),
        };
        self.persist()?;
        debug!(id, "filled translate box from history");
        Ok(item)
    }

    // ----- panels -----

    pub async fn history(&mut self, search: Option<&str>) -> Result<PanelView<HistoryItem>> {
        if !self.is_authenticated() {
            return Ok(PanelView::LoginRequired);
        }
        let result = self.api.history(&self.session, search).await;
        Ok(PanelView::Items(self.check(result)?))
    }

    /// History with saved flags, fetched together with the saved list.
    pub async fn full_history(&mut self, search: Option<&str>) -> Result<PanelView<HistoryEntry>> {
        if !self.is_authenticated() {
            return Ok(PanelView::LoginRequired);
        }
        let (history, saved) = tokio::join!(
            self.api.history(&self.session, search),
            self.api.saved_translations(&self.session, None),
        );
        let history = self.check(history)?;
        let saved = self.saved_or_empty(saved);
        Ok(PanelView::Items(overlay_saved(history, &saved)))
    }

    pub async fn saved(&mut self, search: Option<&str>) -> Result<PanelView<SavedTranslation>> {
        if !self.is_authenticated() {
            return Ok(PanelView::LoginRequired);
        }
        let result = self.api.saved_translations(&self.session, search).await;
        Ok(PanelView::Items(self.check(result)?))
    }

    // ----- deletion -----

    pub async fn delete_history_item(&mut self, id: i64, prompt: &dyn Prompt) -> Result<DeleteOutcome> {
        self.require_login(GuardedAction::Delete)?;
        if !prompt.confirm(Confirmation::DeleteItem)? {
            return Ok(DeleteOutcome::Cancelled);
        }
        let result = self.api.delete_history_item(&self.session, id).await;
        let response = self.check(result)?;
        info!(id, "history item deleted");
        self.refresh_after_delete(response).await
    }

    /// Remove all history; the backend drops saved translations with it.
    pub async fn clear_history(&mut self, prompt: &dyn Prompt) -> Result<DeleteOutcome> {
        self.require_login(GuardedAction::Delete)?;
        if !prompt.confirm(Confirmation::ClearHistory)? {
            return Ok(DeleteOutcome::Cancelled);
        }
        let result = self.api.clear_history(&self.session).await;
        let response = self.check(result)?;
        info!("history cleared");
        self.refresh_after_delete(response).await
    }

    pub async fn delete_saved_item(&mut self, id: i64, prompt: &dyn Prompt) -> Result<DeleteOutcome> {
        self.require_login(GuardedAction::Delete)?;
        if !prompt.confirm(Confirmation::DeleteItem)? {
            return Ok(DeleteOutcome::Cancelled);
        }
        let result = self.api.delete_saved_translation(&self.session, id).await;
        let response = self.check(result)?;
        info!(id, "saved translation deleted");
        self.refresh_after_delete(response).await
    }

    pub async fn clear_saved(&mut self, prompt: &dyn Prompt) -> Result<DeleteOutcome> {
        self.require_login(GuardedAction::Delete)?;
        if !prompt.confirm(Confirmation::ClearSaved)? {
            return Ok(DeleteOutcome::Cancelled);
        }
        let result = self.api.clear_saved_translations(&self.session).await;
        let response = self.check(result)?;
        info!("saved translations cleared");
        self.refresh_after_delete(response).await
    }

    /// Reload both panels after a successful delete. The delete already went through,
    /// so refresh failures are logged and an unknown saved list leaves the indicator as is.
    async fn refresh_after_delete(&mut self, response: MessageResponse) -> Result<DeleteOutcome> {
        let result = self.api.history(&self.session, None).await;
        let history = self.after_delete(result, "history").unwrap_or_default();
        let result = self.api.saved_translations(&self.session, None).await;
        let saved = self.after_delete(result, "saved translations");

        if let Some(saved) = saved.as_deref() {
            if self.panel.has_translation() {
                let still_saved = saved.iter().any(|entry| {
                    entry.original_text == self.panel.input
                        && entry.translated_text == self.panel.output
                });
                self.panel.status.saved = still_saved;
                self.persist()?;
            }
        }

        let saved = saved.unwrap_or_default();
        Ok(DeleteOutcome::Deleted {
            message: message_of(&response),
            history: overlay_saved(history, &saved),
            saved,
        })
    }

    fn after_delete<T>(&mut self, result: Result<Vec<T>, ClientError>, panel: &str) -> Option<Vec<T>> {
        match result {
            Ok(items) => Some(items),
            Err(err) => {
                if err.is_session_expired() {
                    self.expire_session();
                }
                warn!(error = %err, panel, "failed to reload panel after delete");
                None
            }
        }
    }

    // ----- helpers -----

    fn require_login(&self, action: GuardedAction) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(ClientError::LoginRequired { action }.into())
        }
    }

    fn current_key(&self) -> Option<SavedTranslationKey> {
        self.panel.has_translation().then(|| SavedTranslationKey {
            original_text: self.panel.input.clone(),
            translated_text: self.panel.output.clone(),
            source_lang: self.panel.source_lang.clone(),
            target_lang: self.panel.target_lang.clone(),
        })
    }

    /// Pass a request result through, logging out on an expired session.
    fn check<T>(&mut self, result: Result<T, ClientError>) -> Result<T> {
        match result {
            Err(ClientError::SessionExpired) => {
                self.expire_session();
                Err(ClientError::SessionExpired.into())
            }
            other => other.map_err(Into::into),
        }
    }

    fn saved_or_empty(&mut self, result: Result<Vec<SavedTranslation>, ClientError>) -> Vec<SavedTranslation> {
        match result {
            Ok(saved) => saved,
            Err(err) => {
                if err.is_session_expired() {
                    self.expire_session();
                }
                warn!(error = %err, "failed to load saved translations; assuming none");
                Vec::new()
            }
        }
    }

    fn expire_session(&mut self) {
        warn!("access token rejected; logging out");
        if let Err(err) = self.logout() {
            warn!(error = %err, "failed to clear expired session");
        }
    }

    fn persist(&self) -> Result<()> {
        self.panel.save(&self.panel_path)
    }
}

/// Resolve saved flags: the server's `is_saved` wins, otherwise original-text membership.
fn overlay_saved(history: Vec<HistoryItem>, saved: &[SavedTranslation]) -> Vec<HistoryEntry> {
    let saved_originals: HashSet<&str> =
        saved.iter().map(|entry| entry.original_text.as_str()).collect();
    history
        .into_iter()
        .map(|item| {
            let saved = item
                .is_saved
                .unwrap_or_else(|| saved_originals.contains(item.original_text.as_str()));
            HistoryEntry { item, saved }
        })
        .collect()
}

fn message_of(response: &MessageResponse) -> Option<String> {
    response.message().map(str::to_string)
}

/// Text shown in the output area when a translation fails.
fn inline_error(err: &ClientError) -> String {
    match err {
        ClientError::Api { detail, .. } => format!("Error: {detail}"),
        ClientError::Network { source, .. } | ClientError::Decode { source, .. } => {
            format!("Network Error: {source}")
        }
        other => format!("Error: {other}"),
    }
}
