//! In-process stand-in for the Drive search and Docs endpoints.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dictdoc_auth::AuthToken;
use serde_json::{Value, json};

use crate::DocumentStore;

pub const FAKE_TOKEN: &str = "fake-token";

pub fn token(secret: &str) -> AuthToken {
    AuthToken::new(secret)
}

struct FakeDocument {
    id: String,
    title: String,
    text: String,
}

#[derive(Default)]
struct FakeState {
    documents: Vec<FakeDocument>,
    next_id: u64,
    search_calls: usize,
    create_calls: usize,
    append_calls: usize,
    /// Endpoint names in the order they were served
    call_log: Vec<&'static str>,
    fail_creates: bool,
}

impl FakeState {
    fn add(&mut self, title: &str, text: &str) -> String {
        self.next_id += 1;
        let id = format!("doc-{}", self.next_id);
        self.documents.push(FakeDocument {
            id: id.clone(),
            title: title.to_string(),
            text: text.to_string(),
        });
        id
    }
}

type Shared = Arc<Mutex<FakeState>>;

#[derive(Clone)]
pub struct FakeGoogle {
    base: String,
    state: Shared,
}

impl FakeGoogle {
    pub async fn start() -> std::io::Result<Self> {
        let state = Shared::default();
        let router = Router::new()
            .route("/drive/v3/files", get(search))
            .route("/docs/v1/documents", post(create))
            .route("/docs/v1/documents/:target", get(fetch).post(batch_update))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("fake google server exited: {e}");
            }
        });

        Ok(Self {
            base: format!("http://{addr}"),
            state,
        })
    }

    pub fn drive_url(&self) -> String {
        format!("{}/drive/v3", self.base)
    }

    pub fn docs_url(&self) -> String {
        format!("{}/docs/v1", self.base)
    }

    pub fn store(&self) -> DocumentStore {
        DocumentStore::new(self.drive_url(), self.docs_url())
    }

    pub fn token(&self) -> AuthToken {
        token(FAKE_TOKEN)
    }

    pub fn insert_document(&self, title: &str, text: &str) -> String {
        self.lock().add(title, text)
    }

    /// Body text without the trailing terminator
    pub fn document_text(&self, id: &str) -> Option<String> {
        self.lock()
            .documents
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.text.clone())
    }

    pub fn documents_titled(&self, title: &str) -> Vec<String> {
        self.lock()
            .documents
            .iter()
            .filter(|d| d.title == title)
            .map(|d| d.id.clone())
            .collect()
    }

    pub fn document_count(&self) -> usize {
        self.lock().documents.len()
    }

    pub fn search_calls(&self) -> usize {
        self.lock().search_calls
    }

    pub fn create_calls(&self) -> usize {
        self.lock().create_calls
    }

    pub fn append_calls(&self) -> usize {
        self.lock().append_calls
    }

    pub fn call_log(&self) -> Vec<&'static str> {
        self.lock().call_log.clone()
    }

    pub fn fail_creates(&self) {
        self.lock().fail_creates = true;
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        lock(&self.state)
    }
}

fn lock(state: &Shared) -> MutexGuard<'_, FakeState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {FAKE_TOKEN}"))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": { "code": 401, "status": "UNAUTHENTICATED" } })),
    )
        .into_response()
}

/// Pull the title out of `name="..." and mimeType="..."`
fn queried_name(q: &str) -> Option<String> {
    let rest = q.strip_prefix("name=\"")?;
    let end = rest.rfind("\" and mimeType=")?;
    Some(rest[..end].replace("\\\"", "\"").replace("\\\\", "\\"))
}

async fn search(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut state = lock(&state);
    state.search_calls += 1;
    state.call_log.push("search");

    let Some(name) = params.get("q").and_then(|q| queried_name(q)) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let files: Vec<Value> = state
        .documents
        .iter()
        .filter(|d| d.title == name)
        .map(|d| json!({ "id": d.id, "name": d.title }))
        .collect();

    Json(json!({ "kind": "drive#fileList", "files": files })).into_response()
}

async fn create(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut state = lock(&state);
    state.create_calls += 1;
    state.call_log.push("create");

    if state.fail_creates {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let title = body["title"].as_str().unwrap_or("Untitled document").to_string();
    let id = state.add(&title, "");

    Json(json!({ "documentId": id, "title": title })).into_response()
}

async fn fetch(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(target): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut state = lock(&state);
    state.call_log.push("fetch");
    let Some(document) = state.documents.iter().find(|d| d.id == target) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    // Index 1 starts the body and the body always ends with one implicit newline
    let end = document.text.chars().count() as u64 + 2;
    Json(json!({
        "documentId": document.id,
        "title": document.title,
        "body": { "content": [
            { "endIndex": 1, "sectionBreak": {} },
            { "startIndex": 1, "endIndex": end, "paragraph": {} }
        ]}
    }))
    .into_response()
}

async fn batch_update(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(target): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let Some(id) = target.strip_suffix(":batchUpdate") else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let mut state = lock(&state);
    state.append_calls += 1;
    state.call_log.push("batchUpdate");

    let Some(document) = state.documents.iter_mut().find(|d| d.id == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let Some(requests) = body["requests"].as_array() else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    for request in requests {
        let insert = &request["insertText"];
        let (Some(index), Some(text)) = (insert["location"]["index"].as_u64(), insert["text"].as_str())
        else {
            return StatusCode::BAD_REQUEST.into_response();
        };

        let mut chars: Vec<char> = document.text.chars().collect();
        let at = (index.saturating_sub(1) as usize).min(chars.len());
        chars.splice(at..at, text.chars());
        document.text = chars.into_iter().collect();
    }

    Json(json!({ "documentId": id, "replies": [{}] })).into_response()
}
