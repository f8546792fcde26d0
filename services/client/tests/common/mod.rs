//! In-process stand-ins for the document-query backend and the pinning API.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct ReceivedFile {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub len: usize,
    pub api_key: Option<String>,
    pub secret_key: Option<String>,
}

#[derive(Clone)]
pub struct MockBackend {
    pub upload_reply: (StatusCode, Value),
    pub chat_reply: (StatusCode, Value),
    pub uploads: Arc<Mutex<Vec<ReceivedFile>>>,
    pub chats: Arc<Mutex<Vec<Value>>>,
}

impl MockBackend {
    pub fn new(upload_reply: (StatusCode, Value), chat_reply: (StatusCode, Value)) -> Self {
        Self {
            upload_reply,
            chat_reply,
            uploads: Arc::default(),
            chats: Arc::default(),
        }
    }

    /// Upload answers `{"file_id": file_id}`, chat answers `{"chat_response": answer}`.
    pub fn answering(file_id: &str, answer: &str) -> Self {
        Self::new(
            (StatusCode::OK, json!({ "file_id": file_id })),
            (StatusCode::OK, json!({ "chat_response": answer })),
        )
    }

    pub fn uploads(&self) -> Vec<ReceivedFile> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn chats(&self) -> Vec<Value> {
        self.chats.lock().unwrap().clone()
    }
}

async fn read_file(headers: &HeaderMap, mut multipart: Multipart) -> ReceivedFile {
    let field = multipart.next_field().await.unwrap().expect("multipart body has a field");
    let name = field.name().unwrap_or_default().to_string();
    let file_name = field.file_name().map(str::to_string);
    let content_type = field.content_type().map(str::to_string);
    let len = field.bytes().await.unwrap().len();
    let header = |key: &str| headers.get(key).and_then(|v| v.to_str().ok()).map(str::to_string);

    ReceivedFile {
        field: name,
        file_name,
        content_type,
        len,
        api_key: header("pinata_api_key"),
        secret_key: header("pinata_secret_api_key"),
    }
}

async fn upload(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let received = read_file(&headers, multipart).await;
    backend.uploads.lock().unwrap().push(received);
    let (status, body) = backend.upload_reply.clone();
    (status, Json(body))
}

async fn chat(State(backend): State<MockBackend>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    backend.chats.lock().unwrap().push(body);
    let (status, body) = backend.chat_reply.clone();
    (status, Json(body))
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Serves `/api/ml/v1/upload` and `/api/ml/v1/chat`; returns the base URL.
pub async fn spawn_query_backend(backend: MockBackend) -> String {
    let router = Router::new()
        .route("/api/ml/v1/upload", post(upload))
        .route("/api/ml/v1/chat", post(chat))
        .with_state(backend);
    serve(router).await
}

/// Serves `/pinning/pinFileToIPFS`, answering with `upload_reply`; returns the endpoint URL.
pub async fn spawn_pinning_api(backend: MockBackend) -> String {
    let router = Router::new()
        .route("/pinning/pinFileToIPFS", post(upload))
        .with_state(backend);
    format!("{}/pinning/pinFileToIPFS", serve(router).await)
}
