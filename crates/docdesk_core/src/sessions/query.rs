//! crates/docdesk_core/src/sessions/query.rs
//!
//! State for the document-query chat: the selected document, the handle the
//! backend assigned to it and the running transcript.

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{PendingUpload, SessionError};
use crate::domain::{FileSource, Message, SelectedFile, SessionHandle};
use crate::ports::{DocumentQueryService, PortResult};
use crate::preview::{FileSlot, PreviewRegistry};

/// What happened to a submitted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty input with no file selected; the transcript was not touched.
    Ignored,
    /// The user message was appended but no document is attached yet, so nothing was sent.
    Recorded,
    /// The question was answered; holds the id of the appended assistant message.
    Answered(Uuid),
}

pub struct QuerySession {
    file: FileSlot,
    handle: Option<SessionHandle>,
    transcript: Vec<Message>,
    draft: String,
    uploading: Option<String>,
    scroll_anchor: Option<Uuid>,
    last_error: Option<String>,
}

impl QuerySession {
    pub fn new(registry: PreviewRegistry) -> Self {
        Self {
            file: FileSlot::new(registry),
            handle: None,
            transcript: Vec::new(),
            draft: String::new(),
            uploading: None,
            scroll_anchor: None,
            last_error: None,
        }
    }

    //=====================================================================================
    // Selection
    //=====================================================================================

    pub fn select_file(&mut self, source: FileSource) -> &SelectedFile {
        if source.mime_type != "application/pdf" {
            warn!(file = %source.name, mime = %source.mime_type, "Document is not a PDF");
        }
        self.last_error = None;
        self.file.select(source)
    }

    /// Drops the selected file. The session handle of an earlier upload is kept.
    pub fn remove_file(&mut self) -> bool {
        self.file.release()
    }

    //=====================================================================================
    // Upload
    //=====================================================================================

    pub fn begin_upload(&mut self) -> Result<PendingUpload, SessionError> {
        let file = self.file.current().ok_or(SessionError::NoFileSelected)?;
        if self.uploading.as_deref() == Some(file.preview_url()) {
            return Err(SessionError::UploadInProgress);
        }

        let pending = PendingUpload::new(file.source.clone(), file.preview_url().to_string());
        self.uploading = Some(pending.preview_url().to_string());
        info!(file = %file.name(), size = file.size_bytes(), "Uploading document");
        Ok(pending)
    }

    /// Applies the result of an upload started with `begin_upload`.
    ///
    /// A successful result always replaces the session handle, even if another file
    /// has been selected in the meantime. A failure leaves the handle unchanged.
    pub fn complete_upload(
        &mut self,
        pending: PendingUpload,
        result: PortResult<SessionHandle>,
    ) -> Result<SessionHandle, SessionError> {
        if self.uploading.as_deref() == Some(pending.preview_url()) {
            self.uploading = None;
        }

        match result {
            Ok(handle) => {
                info!(file = %pending.source().name, document_id = %handle, "Document uploaded");
                self.handle = Some(handle.clone());
                self.last_error = None;
                Ok(handle)
            }
            Err(e) => {
                error!(file = %pending.source().name, "Document upload failed: {}", e);
                self.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    pub async fn upload(&mut self, service: &dyn DocumentQueryService) -> Result<SessionHandle, SessionError> {
        let pending = self.begin_upload()?;
        let result = service.upload_document(pending.source()).await;
        self.complete_upload(pending, result)
    }

    /// Selects `source` and immediately uploads it, as picking a file in the chat view does.
    pub async fn attach_document(
        &mut self,
        source: FileSource,
        service: &dyn DocumentQueryService,
    ) -> Result<SessionHandle, SessionError> {
        self.select_file(source);
        self.upload(service).await
    }

    //=====================================================================================
    // Messaging
    //=====================================================================================

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Sends whatever is currently in the input buffer.
    pub async fn submit_draft(&mut self, service: &dyn DocumentQueryService) -> Result<SendOutcome, SessionError> {
        let text = self.draft.clone();
        self.send_user_message(&text, service).await
    }

    /// Appends `text` as a user message and, once a document is attached, asks the
    /// backend about it.
    ///
    /// The user message is recorded before the request goes out. A failed request adds
    /// nothing to the transcript; the failure is kept in `last_error` and returned.
    pub async fn send_user_message(
        &mut self,
        text: &str,
        service: &dyn DocumentQueryService,
    ) -> Result<SendOutcome, SessionError> {
        if text.trim().is_empty() && self.file.is_empty() {
            return Ok(SendOutcome::Ignored);
        }

        self.transcript.push(Message::user(text));
        self.draft.clear();

        let Some(handle) = self.handle.clone() else {
            debug!("No document attached yet, message kept locally");
            return Ok(SendOutcome::Recorded);
        };

        match service.ask_question(text, &handle).await {
            Ok(answer) => {
                let reply = Message::assistant(answer);
                let id = reply.id;
                self.transcript.push(reply);
                self.scroll_anchor = Some(id);
                self.last_error = None;
                Ok(SendOutcome::Answered(id))
            }
            Err(e) => {
                error!(document_id = %handle, "Chat request failed: {}", e);
                self.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    pub fn reset_transcript(&mut self) {
        if !self.transcript.is_empty() {
            warn!(messages = self.transcript.len(), "Clearing transcript");
        }
        self.transcript.clear();
        self.scroll_anchor = None;
    }

    //=====================================================================================
    // Accessors
    //=====================================================================================

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn session_handle(&self) -> Option<&SessionHandle> {
        self.handle.as_ref()
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.file.current()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
            .as_deref()
            .is_some_and(|url| self.file.holds(url))
    }

    /// The newest assistant message the view should scroll to.
    pub fn scroll_anchor(&self) -> Option<Uuid> {
        self.scroll_anchor
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
