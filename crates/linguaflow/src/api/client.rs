use reqwest::{Method, RequestBuilder, StatusCode, header::AUTHORIZATION};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};
use url::Url;

use super::{
    detail::detail_from_body,
    types::{
        ContributionRequest, Credentials, HistoryItem, MessageResponse, RatingRequest,
        Registration, SavedTranslation, SavedTranslationKey, TokenResponse, TranslationRequest,
        TranslationResult,
    },
};
use crate::{error::ClientError, session::Session};

const USER_AGENT: &str = concat!("linguaflow/", env!("CARGO_PKG_VERSION"));

/// How a request treats the session token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Auth {
    /// Never sends a token; `401` is an ordinary API error.
    None,
    /// Sends the token when there is one; `401` is an ordinary API error.
    Optional,
    /// Requires a token; `401` means the session expired.
    Required,
}

/// Typed client for the translation backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: Url) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| ClientError::HttpClient { source })?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, ClientError> {
        let url = self.endpoint("/login", None);
        let request = self.http.post(url.clone()).json(credentials);
        self.execute(request, &url, Auth::None).await
    }

    pub async fn register(&self, registration: &Registration) -> Result<TokenResponse, ClientError> {
        let url = self.endpoint("/register", None);
        let request = self.http.post(url.clone()).json(registration);
        self.execute(request, &url, Auth::None).await
    }

    /// Translate text; the token is attached when present so the backend records history.
    pub async fn translate(
        &self,
        session: &Session,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, ClientError> {
        self.send_json(session, Method::POST, "/translate", request, Auth::Optional).await
    }

    pub async fn history(
        &self,
        session: &Session,
        search: Option<&str>,
    ) -> Result<Vec<HistoryItem>, ClientError> {
        let url = self.endpoint("/history", search);
        let request = self.authorize(session, Method::GET, &url, Auth::Required)?;
        self.execute(request, &url, Auth::Required).await
    }

    pub async fn delete_history_item(
        &self,
        session: &Session,
        id: i64,
    ) -> Result<MessageResponse, ClientError> {
        self.send_empty(session, Method::DELETE, &format!("/history/{id}")).await
    }

    pub async fn clear_history(&self, session: &Session) -> Result<MessageResponse, ClientError> {
        self.send_empty(session, Method::DELETE, "/history").await
    }

    pub async fn save_translation(
        &self,
        session: &Session,
        key: &SavedTranslationKey,
    ) -> Result<SavedTranslation, ClientError> {
        self.send_json(session, Method::POST, "/saved-translations", key, Auth::Required).await
    }

    pub async fn unsave_translation(
        &self,
        session: &Session,
        key: &SavedTranslationKey,
    ) -> Result<MessageResponse, ClientError> {
        self.send_json(session, Method::POST, "/saved-translations/unsave", key, Auth::Required)
            .await
    }

    pub async fn saved_translations(
        &self,
        session: &Session,
        search: Option<&str>,
    ) -> Result<Vec<SavedTranslation>, ClientError> {
        let url = self.endpoint("/saved-translations", search);
        let request = self.authorize(session, Method::GET, &url, Auth::Required)?;
        self.execute(request, &url, Auth::Required).await
    }

    pub async fn delete_saved_translation(
        &self,
        session: &Session,
        id: i64,
    ) -> Result<MessageResponse, ClientError> {
        self.send_empty(session, Method::DELETE, &format!("/saved-translations/{id}")).await
    }

    pub async fn clear_saved_translations(
        &self,
        session: &Session,
    ) -> Result<MessageResponse, ClientError> {
        self.send_empty(session, Method::DELETE, "/saved-translations").await
    }

    pub async fn rate(
        &self,
        session: &Session,
        request: &RatingRequest,
    ) -> Result<MessageResponse, ClientError> {
        self.send_json(session, Method::POST, "/rate", request, Auth::Required).await
    }

    pub async fn undo_rating(
        &self,
        session: &Session,
        request: &RatingRequest,
    ) -> Result<MessageResponse, ClientError> {
        self.send_json(session, Method::POST, "/rate/undo", request, Auth::Required).await
    }

    pub async fn contribute(
        &self,
        session: &Session,
        request: &ContributionRequest,
    ) -> Result<MessageResponse, ClientError> {
        self.send_json(session, Method::POST, "/contribute", request, Auth::Required).await
    }

    async fn send_json<B, T>(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        body: &B,
        auth: Auth,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path, None);
        let request = self.authorize(session, method, &url, auth)?.json(body);
        self.execute(request, &url, auth).await
    }

    async fn send_empty<T>(&self, session: &Session, method: Method, path: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(path, None);
        let request = self.authorize(session, method, &url, Auth::Required)?;
        self.execute(request, &url, Auth::Required).await
    }

    fn authorize(
        &self,
        session: &Session,
        method: Method,
        url: &Url,
        auth: Auth,
    ) -> Result<RequestBuilder, ClientError> {
        let mut request = self.http.request(method, url.clone());
        match (auth, session.bearer()) {
            (Auth::None, _) => {}
            (_, Some(bearer)) => request = request.header(AUTHORIZATION, bearer),
            (Auth::Optional, None) => {}
            (Auth::Required, None) => {
                return Err(ClientError::MissingToken { url: url.to_string() });
            }
        }
        Ok(request)
    }

    async fn execute<T>(&self, request: RequestBuilder, url: &Url, auth: Auth) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        debug!(%url, "sending request");
        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Network { url: url.to_string(), source })?;
        let status = response.status();
        debug!(%url, status = status.as_u16(), "received response");

        if status == StatusCode::UNAUTHORIZED && auth == Auth::Required {
            warn!(%url, "backend rejected the access token");
            return Err(ClientError::SessionExpired);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                url: url.to_string(),
                status: status.as_u16(),
                detail: detail_from_body(&body),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|source| ClientError::Decode { url: url.to_string(), source })
    }

    /// Join `path` onto the base URL, keeping any base path prefix.
    fn endpoint(&self, path: &str, search: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!("{}{}", url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        url.set_query(None);
        url.set_fragment(None);
        if let Some(term) = search.filter(|term| !term.is_empty()) {
            url.query_pairs_mut().append_pair("search", term);
        }
        url
    }
}
