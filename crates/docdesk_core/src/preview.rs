//! crates/docdesk_core/src/preview.rs
//!
//! Owns the lifetime of the local preview resources created for selected files.
//!
//! A `PreviewRegistry` hands out `PreviewHandle`s and keeps track of which ones are
//! still live. Handles release themselves on drop, and a `FileSlot` makes sure a
//! session never holds more than one selected file (and therefore one preview) at a time.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;
use uuid::Uuid;

use crate::domain::{FileSource, SelectedFile};

//=========================================================================================
// PreviewRegistry
//=========================================================================================

/// Allocates preview URLs and remembers which ones have not been released yet.
///
/// Cloning the registry is cheap; all clones share the same set of live handles.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashSet<String>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new preview handle for `source`.
    pub fn allocate(&self, source: &FileSource) -> PreviewHandle {
        let url = format!("preview://{}/{}", Uuid::new_v4(), source.name);
        self.lock().insert(url.clone());
        debug!(url = %url, "Allocated preview handle");

        PreviewHandle {
            url,
            registry: self.clone(),
            released: false,
        }
    }

    /// Number of handles that have been allocated and not yet released.
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    fn revoke(&self, url: &str) -> bool {
        self.lock().remove(url)
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a holder panicked, so poisoning is ignored.
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

//=========================================================================================
// PreviewHandle
//=========================================================================================

/// A scoped preview resource. Released explicitly via `release` or implicitly on drop.
#[derive(Debug)]
pub struct PreviewHandle {
    url: String,
    registry: PreviewRegistry,
    released: bool,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Frees the preview. Calling this more than once is a no-op.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if self.registry.revoke(&self.url) {
            debug!(url = %self.url, "Released preview handle");
        }
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.release();
    }
}

//=========================================================================================
// FileSlot
//=========================================================================================

/// Holds at most one `SelectedFile` for a session.
#[derive(Debug)]
pub struct FileSlot {
    registry: PreviewRegistry,
    current: Option<SelectedFile>,
}

impl FileSlot {
    pub fn new(registry: PreviewRegistry) -> Self {
        Self {
            registry,
            current: None,
        }
    }

    /// Selects `source`, releasing the previously selected file's preview first.
    pub fn select(&mut self, source: FileSource) -> &SelectedFile {
        self.release();

        let preview = self.registry.allocate(&source);
        self.current.insert(SelectedFile { source, preview })
    }

    /// Drops the current selection and frees its preview. Returns `false` if nothing
    /// was selected.
    pub fn release(&mut self) -> bool {
        match self.current.take() {
            Some(mut file) => {
                file.preview.release();
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> Option<&SelectedFile> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// True if the current selection is the one whose preview URL is `preview_url`.
    pub fn holds(&self, preview_url: &str) -> bool {
        self.current
            .as_ref()
            .is_some_and(|file| file.preview_url() == preview_url)
    }
}
