//! crates/docdesk_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the external HTTP services.
//! The sessions only talk to these traits, so they stay independent of the
//! concrete transport used by the adapters.

use async_trait::async_trait;

use crate::domain::{FileSource, SessionHandle};

//=========================================================================================
// Port Error and Result Types
//=========================================================================================

/// Errors raised by the external services, with transport details flattened to text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DocumentQueryService: Send + Sync {
    /// Uploads a document and returns the identifier the chat endpoint knows it by.
    async fn upload_document(&self, file: &FileSource) -> PortResult<SessionHandle>;

    /// Asks a question about a previously uploaded document.
    async fn ask_question(&self, question: &str, document: &SessionHandle) -> PortResult<String>;
}

#[async_trait]
pub trait PinningService: Send + Sync {
    /// Pins a file and returns the public URL it can be retrieved from.
    async fn pin_file(&self, file: &FileSource) -> PortResult<String>;
}
