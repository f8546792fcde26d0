//! services/client/src/adapters/query_api.rs
//!
//! This module contains the adapter for the document-query backend.
//! It implements the `DocumentQueryService` port from the `core` crate.

use async_trait::async_trait;
use docdesk_core::domain::{FileSource, SessionHandle};
use docdesk_core::ports::{DocumentQueryService, PortError, PortResult};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{describe_failure, file_form};

const UPLOAD_PATH: &str = "api/ml/v1/upload";
const CHAT_PATH: &str = "api/ml/v1/chat";

#[derive(Serialize)]
struct ChatRequest<'a> {
    current_message: &'a str,
    document_id: &'a str,
}

#[derive(Deserialize)]
struct UploadResponse {
    file_id: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    chat_response: Option<String>,
}

pub struct HttpQueryAdapter {
    client: Client,
    upload_url: String,
    chat_url: String,
}

impl HttpQueryAdapter {
    pub fn new(client: Client, base_url: &Url) -> Self {
        let base = base_url.as_str().trim_end_matches('/');
        Self {
            client,
            upload_url: format!("{}/{}", base, UPLOAD_PATH),
            chat_url: format!("{}/{}", base, CHAT_PATH),
        }
    }
}

#[async_trait]
impl DocumentQueryService for HttpQueryAdapter {
    async fn upload_document(&self, file: &FileSource) -> PortResult<SessionHandle> {
        let form = file_form(file)?;
        debug!(url = %self.upload_url, file = %file.name, "POST upload");

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PortError::UploadFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PortError::UploadFailed(describe_failure(response).await));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| PortError::UploadFailed(format!("malformed upload response: {}", e)))?;

        body.file_id
            .filter(|id| !id.is_empty())
            .map(SessionHandle::new)
            .ok_or_else(|| PortError::UploadFailed("response did not include file_id".to_string()))
    }

    async fn ask_question(&self, question: &str, document: &SessionHandle) -> PortResult<String> {
        let request = ChatRequest {
            current_message: question,
            document_id: document.as_str(),
        };
        debug!(url = %self.chat_url, document_id = %document, "POST chat");

        let response = self
            .client
            .post(&self.chat_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| PortError::QueryFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PortError::QueryFailed(describe_failure(response).await));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| PortError::QueryFailed(format!("malformed chat response: {}", e)))?;

        body.chat_response
            .filter(|answer| !answer.is_empty())
            .ok_or_else(|| PortError::QueryFailed("response did not include chat_response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_joined_onto_the_base_url() {
        let base = Url::parse("http://127.0.0.1:5000").unwrap();
        let adapter = HttpQueryAdapter::new(Client::new(), &base);
        assert_eq!(adapter.upload_url, "http://127.0.0.1:5000/api/ml/v1/upload");
        assert_eq!(adapter.chat_url, "http://127.0.0.1:5000/api/ml/v1/chat");

        let base = Url::parse("https://ml.example.test/legal/").unwrap();
        let adapter = HttpQueryAdapter::new(Client::new(), &base);
        assert_eq!(adapter.upload_url, "https://ml.example.test/legal/api/ml/v1/upload");
    }

    #[test]
    fn chat_request_uses_the_backend_field_names() {
        let request = ChatRequest {
            current_message: "What is this about?",
            document_id: "f1",
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"current_message": "What is this about?", "document_id": "f1"})
        );
    }
}
