//! In-process stand-in for the translation backend.
#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard, mpsc},
    thread,
};

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};

pub const VALID_TOKEN: &str = "test-token";
pub const CREATED_AT: &str = "2024-05-01T10:20:30.123456";

type Shared = Arc<Mutex<MockState>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HistoryRecord {
    pub id: i64,
    pub original_text: String,
    pub translated_text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub rating: Option<i64>,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SavedRecord {
    pub id: i64,
    pub original_text: String,
    pub translated_text: String,
    pub source_lang: String,
    pub target_lang: String,
}

#[derive(Debug)]
pub struct MockState {
    pub users: Vec<(String, String)>,
    pub history: Vec<HistoryRecord>,
    pub saved: Vec<SavedRecord>,
    pub requests: Vec<RecordedRequest>,
    /// `(path, body)` of every rating call.
    pub ratings: Vec<(String, Value)>,
    pub contributions: Vec<Value>,
    pub next_id: i64,
    pub fail_translate: bool,
    /// Reject every token from now on.
    pub expire_tokens: bool,
    /// Include the computed `is_saved` flag in history rows.
    pub report_is_saved: bool,
    /// Answer list requests with a server error.
    pub fail_listing: bool,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            history: Vec::new(),
            saved: Vec::new(),
            requests: Vec::new(),
            ratings: Vec::new(),
            contributions: Vec::new(),
            next_id: 1,
            fail_translate: false,
            expire_tokens: false,
            report_is_saved: true,
            fail_listing: false,
        }
    }
}

impl MockState {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn is_saved(&self, original: &str, translated: &str) -> bool {
        self.saved
            .iter()
            .any(|entry| entry.original_text == original && entry.translated_text == translated)
    }
}

pub struct MockBackend {
    pub url: String,
    state: Shared,
}

impl MockBackend {
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state lock")
    }

    pub fn add_user(&self, username: &str, password: &str) {
        self.state().users.push((username.to_string(), password.to_string()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .count()
    }

    pub fn clear_requests(&self) {
        self.state().requests.clear();
    }
}

/// Start the mock on its own runtime thread and return once it accepts connections.
pub fn spawn_backend() -> MockBackend {
    let state: Shared = Arc::new(Mutex::new(MockState::default()));
    let router = build_router(state.clone());
    let (tx, rx) = mpsc::channel::<SocketAddr>();

    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("mock runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind mock");
            tx.send(listener.local_addr().expect("mock addr")).expect("send addr");
            axum::serve(listener, router).await.expect("serve mock");
        });
    });

    let addr = rx.recv().expect("mock backend address");
    MockBackend { url: format!("http://{addr}"), state }
}

/// A base URL nothing listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    format!("http://{addr}")
}

fn build_router(state: Shared) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/translate", post(translate))
        .route("/history", get(list_history).delete(clear_history))
        .route("/history/:id", delete(delete_history_item))
        .route("/saved-translations", get(list_saved).post(save).delete(clear_saved))
        .route("/saved-translations/unsave", post(unsave))
        .route("/saved-translations/:id", delete(delete_saved_item))
        .route("/rate", post(rate))
        .route("/rate/undo", post(undo_rate))
        .route("/contribute", post(contribute))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let entry = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        authorization: request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    };
    state.lock().expect("mock state lock").requests.push(entry);
    next.run(request).await
}

fn detail(status: StatusCode, detail: Value) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

fn authorized(state: &MockState, headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {VALID_TOKEN}");
    !state.expire_tokens
        && headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()) == Some(expected.as_str())
}

fn unauthorized() -> Response {
    detail(StatusCode::UNAUTHORIZED, json!("Could not validate credentials"))
}

fn token_response() -> Response {
    Json(json!({ "access_token": VALID_TOKEN, "token_type": "bearer" })).into_response()
}

#[derive(Deserialize)]
struct SearchQuery {
    search: Option<String>,
}

fn matches_search(search: &Option<String>, original: &str, translated: &str) -> bool {
    match search.as_deref() {
        None | Some("") => true,
        Some(term) => original.contains(term) || translated.contains(term),
    }
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let state = state.lock().expect("mock state lock");
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    if state.users.iter().any(|(user, pass)| user == username && pass == password) {
        token_response()
    } else {
        detail(StatusCode::UNAUTHORIZED, json!("Incorrect username or password"))
    }
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().expect("mock state lock");
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    let confirm = body["confirm_password"].as_str().unwrap_or_default();
    if password.len() < 6 {
        return detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!([{
                "type": "string_too_short",
                "loc": ["body", "password"],
                "msg": "String should have at least 6 characters"
            }]),
        );
    }
    if password != confirm {
        return detail(StatusCode::BAD_REQUEST, json!("Passwords do not match"));
    }
    if state.users.iter().any(|(user, _)| *user == username) {
        return detail(StatusCode::BAD_REQUEST, json!("Username already registered"));
    }
    state.users.push((username, password));
    token_response()
}

async fn translate(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("mock state lock");
    if state.fail_translate {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, json!("Model not loaded"));
    }
    let text = body["text"].as_str().unwrap_or_default().to_string();
    let source = body["source_lang"].as_str().unwrap_or_default().to_string();
    let target = body["target_lang"].as_str().unwrap_or_default().to_string();
    let translated = format!("[{target}] {text}");
    if authorized(&state, &headers) {
        let id = state.allocate_id();
        state.history.insert(
            0,
            HistoryRecord {
                id,
                original_text: text.clone(),
                translated_text: translated.clone(),
                source_lang: source,
                target_lang: target,
                rating: None,
                suggestion: None,
            },
        );
    }
    Json(json!({ "original": text, "translated": translated })).into_response()
}

async fn list_history(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Response {
    let state = state.lock().expect("mock state lock");
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    if state.fail_listing {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, json!("Database unavailable"));
    }
    let rows: Vec<Value> = state
        .history
        .iter()
        .filter(|row| matches_search(&query.search, &row.original_text, &row.translated_text))
        .map(|row| {
            let mut value = json!({
                "id": row.id,
                "original_text": row.original_text,
                "translated_text": row.translated_text,
                "source_lang": row.source_lang,
                "target_lang": row.target_lang,
                "rating": row.rating,
                "suggestion": row.suggestion,
                "created_at": CREATED_AT,
            });
            if state.report_is_saved {
                value["is_saved"] = json!(state.is_saved(&row.original_text, &row.translated_text));
            }
            value
        })
        .collect();
    Json(rows).into_response()
}

async fn delete_history_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = state.lock().expect("mock state lock");
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let Some(index) = state.history.iter().position(|row| row.id == id) else {
        return detail(StatusCode::NOT_FOUND, json!("Item not found"));
    };
    let removed = state.history.remove(index);
    // Deleting a history row also drops its saved copy.
    state.saved.retain(|row| {
        !(row.original_text == removed.original_text
            && row.translated_text == removed.translated_text
            && row.source_lang == removed.source_lang
            && row.target_lang == removed.target_lang)
    });
    Json(json!({ "message": "Deleted" })).into_response()
}

async fn clear_history(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().expect("mock state lock");
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    state.history.clear();
    state.saved.clear();
    Json(json!({ "message": "All history and saved translations cleared" })).into_response()
}

fn saved_json(row: &SavedRecord) -> Value {
    json!({
        "id": row.id,
        "original_text": row.original_text,
        "translated_text": row.translated_text,
        "source_lang": row.source_lang,
        "target_lang": row.target_lang,
        "created_at": CREATED_AT,
    })
}

async fn list_saved(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Response {
    let state = state.lock().expect("mock state lock");
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    if state.fail_listing {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, json!("Database unavailable"));
    }
    let rows: Vec<Value> = state
        .saved
        .iter()
        .filter(|row| matches_search(&query.search, &row.original_text, &row.translated_text))
        .map(saved_json)
        .collect();
    Json(rows).into_response()
}

async fn save(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().expect("mock state lock");
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let original = body["original_text"].as_str().unwrap_or_default().to_string();
    let translated = body["translated_text"].as_str().unwrap_or_default().to_string();
    if let Some(existing) = state
        .saved
        .iter()
        .find(|row| row.original_text == original && row.translated_text == translated)
    {
        return Json(saved_json(existing)).into_response();
    }
    let id = state.allocate_id();
    let row = SavedRecord {
        id,
        original_text: original,
        translated_text: translated,
        source_lang: body["source_lang"].as_str().unwrap_or_default().to_string(),
        target_lang: body["target_lang"].as_str().unwrap_or_default().to_string(),
    };
    let response = saved_json(&row);
    state.saved.insert(0, row);
    Json(response).into_response()
}

async fn unsave(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().expect("mock state lock");
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let original = body["original_text"].as_str().unwrap_or_default();
    let translated = body["translated_text"].as_str().unwrap_or_default();
    let before = state.saved.len();
    state
        .saved
        .retain(|row| !(row.original_text == original && row.translated_text == translated));
    if state.saved.len() == before {
        return Json(json!({ "message": "Item was not saved" })).into_response();
    }
    Json(json!({ "message": "Unsaved successfully" })).into_response()
}

async fn delete_saved_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = state.lock().expect("mock state lock");
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let before = state.saved.len();
    state.saved.retain(|row| row.id != id);
    if state.saved.len() == before {
        return detail(StatusCode::NOT_FOUND, json!("Item not found"));
    }
    Json(json!({ "message": "Deleted" })).into_response()
}

async fn clear_saved(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().expect("mock state lock");
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    state.saved.clear();
    Json(json!({ "message": "All saved translations cleared" })).into_response()
}

fn apply_rating(state: &mut MockState, body: &Value, rating: Option<i64>) {
    let original = body["original_text"].as_str().unwrap_or_default();
    let translated = body["translated_text"].as_str().unwrap_or_default();
    for row in state.history.iter_mut() {
        if row.original_text == original && row.translated_text == translated {
            row.rating = rating;
        }
    }
}

async fn rate(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().expect("mock state lock");
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let rating = body["rating"].as_i64();
    apply_rating(&mut state, &body, rating);
    state.ratings.push(("/rate".to_string(), body));
    Json(json!({ "message": "Rating received" })).into_response()
}

async fn undo_rate(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("mock state lock");
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    apply_rating(&mut state, &body, None);
    state.ratings.push(("/rate/undo".to_string(), body));
    Json(json!({ "message": "" })).into_response()
}

async fn contribute(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("mock state lock");
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let original = body["original_text"].as_str().unwrap_or_default().to_string();
    let suggestion = body["suggested_translation"].as_str().map(str::to_string);
    for row in state.history.iter_mut() {
        if row.original_text == original {
            row.suggestion = suggestion.clone();
        }
    }
    state.contributions.push(body);
    Json(json!({ "message": "Contribution received. Thank you!" })).into_response()
}
