//! crates/docdesk_core/src/domain.rs
//!
//! Defines the pure, core data structures shared by the query and sharing sessions.
//! These structs are independent of any transport or serialization format.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::preview::PreviewHandle;

/// Raw file contents as handed over by the picker (or a drop), before any preview exists.
#[derive(Debug, Clone)]
pub struct FileSource {
    pub name: String,
    pub mime_type: String,
    pub contents: Bytes,
}

impl FileSource {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            contents: contents.into(),
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.contents.len() as u64
    }
}

/// The single file currently selected in a session, together with its preview handle.
///
/// The handle is released when the `SelectedFile` is dropped, so replacing or removing
/// the selection always frees the previous preview.
#[derive(Debug)]
pub struct SelectedFile {
    pub source: FileSource,
    pub preview: PreviewHandle,
}

impl SelectedFile {
    pub fn name(&self) -> &str {
        &self.source.name
    }

    pub fn size_bytes(&self) -> u64 {
        self.source.size_bytes()
    }

    pub fn mime_type(&self) -> &str {
        &self.source.mime_type
    }

    pub fn preview_url(&self) -> &str {
        self.preview.url()
    }
}

/// Opaque identifier returned by the document-query upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle(String);

impl SessionHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Represents a single entry of the query transcript. Immutable once created.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Represents a file that was successfully pinned during the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFileRecord {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub retrieval_url: String,
}

/// Formats a byte count for display, e.g. `524288` becomes `"512.0 KB"`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", size, UNITS[unit])
}
