//! crates/docdesk_core/src/sessions/mod.rs
//!
//! The per-view session state machines. Each session owns its selected file,
//! drives one external service port and keeps the state a front-end renders.

pub mod query;
pub mod sharing;

use crate::domain::FileSource;
use crate::ports::PortError;

pub use query::{QuerySession, SendOutcome};
pub use sharing::{ProcessingStatus, SharingSession};

/// Errors returned by session operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("No file is selected")]
    NoFileSelected,
    #[error("An upload is already in progress for the selected file")]
    UploadInProgress,
    #[error("Cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        from: ProcessingStatus,
        to: ProcessingStatus,
    },
    #[error(transparent)]
    Port(#[from] PortError),
}

/// An upload that has been started but whose result has not been applied yet.
///
/// Returned by `begin_upload` and handed back to `complete_upload`, so a front-end can
/// keep dispatching events while the transfer is outstanding.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    source: FileSource,
    preview_url: String,
}

impl PendingUpload {
    pub(crate) fn new(source: FileSource, preview_url: String) -> Self {
        Self { source, preview_url }
    }

    /// The file snapshot to transmit.
    pub fn source(&self) -> &FileSource {
        &self.source
    }

    /// Identifies the selection this upload was started for.
    pub fn preview_url(&self) -> &str {
        &self.preview_url
    }
}
