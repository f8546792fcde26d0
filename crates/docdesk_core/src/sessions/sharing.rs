//! crates/docdesk_core/src/sessions/sharing.rs
//!
//! State for the document-sharing view: the selected file, the upload status
//! and the list of files pinned during this session.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{error, info};

use super::{PendingUpload, SessionError};
use crate::domain::{FileSource, SelectedFile, UploadedFileRecord};
use crate::ports::{PinningService, PortResult};
use crate::preview::{FileSlot, PreviewRegistry};

/// How long the success notice stays visible after an upload.
pub const NOTICE_DURATION: Duration = Duration::from_millis(2000);

pub const UPLOAD_SUCCEEDED_MESSAGE: &str = "File uploaded successfully!";
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to send the file. Please try again.";
pub const NO_FILE_MESSAGE: &str = "Please select a file to upload.";

/// An enum representing where the sharing view is in its upload cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    Idle,
    Uploading,
    Completed,
    Error,
}

impl ProcessingStatus {
    /// Every state may fall back to `Idle` through a new selection or removal. Otherwise
    /// `Idle -> Uploading -> {Completed, Error}`, and a failed upload of the still-selected
    /// file may be retried (`Error -> Uploading`).
    pub fn can_transition_to(self, next: ProcessingStatus) -> bool {
        use ProcessingStatus::*;
        matches!(
            (self, next),
            (_, Idle) | (Idle, Uploading) | (Error, Uploading) | (Uploading, Completed) | (Uploading, Error)
        )
    }
}

#[derive(Debug)]
struct Notice {
    text: &'static str,
    raised_at: Instant,
}

pub struct SharingSession {
    file: FileSlot,
    status: ProcessingStatus,
    error_message: Option<String>,
    uploaded: Vec<UploadedFileRecord>,
    notice: Option<Notice>,
}

impl SharingSession {
    pub fn new(registry: PreviewRegistry) -> Self {
        Self {
            file: FileSlot::new(registry),
            status: ProcessingStatus::Idle,
            error_message: None,
            uploaded: Vec::new(),
            notice: None,
        }
    }

    //=====================================================================================
    // Selection
    //=====================================================================================

    /// Selects a picked or dropped file. Resets the status to `Idle` and clears any error.
    pub fn select_file(&mut self, source: FileSource) -> &SelectedFile {
        self.reset_status();
        self.file.select(source)
    }

    pub fn remove_file(&mut self) -> bool {
        self.reset_status();
        self.file.release()
    }

    fn reset_status(&mut self) {
        self.status = ProcessingStatus::Idle;
        self.error_message = None;
    }

    fn transition(&mut self, next: ProcessingStatus) -> Result<(), SessionError> {
        if !self.status.can_transition_to(next) {
            return Err(SessionError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    //=====================================================================================
    // Upload
    //=====================================================================================

    pub fn begin_upload(&mut self) -> Result<PendingUpload, SessionError> {
        let Some(file) = self.file.current() else {
            self.error_message = Some(NO_FILE_MESSAGE.to_string());
            return Err(SessionError::NoFileSelected);
        };
        let pending = PendingUpload::new(file.source.clone(), file.preview_url().to_string());

        if self.status == ProcessingStatus::Uploading {
            return Err(SessionError::UploadInProgress);
        }
        self.transition(ProcessingStatus::Uploading)?;
        self.error_message = None;

        info!(file = %pending.source().name, size = pending.source().size_bytes(), "Pinning file");
        Ok(pending)
    }

    /// Applies the result of an upload started with `begin_upload`.
    ///
    /// A successful upload is always recorded. Status, error message and selection only
    /// change if the upload belongs to the file that is still selected.
    pub fn complete_upload(
        &mut self,
        pending: PendingUpload,
        result: PortResult<String>,
    ) -> Result<UploadedFileRecord, SessionError> {
        let current = self.status == ProcessingStatus::Uploading && self.file.holds(pending.preview_url());
        let source = pending.source();

        match result {
            Ok(retrieval_url) => {
                info!(file = %source.name, url = %retrieval_url, "File pinned");
                let record = self.record_upload(
                    source.name.clone(),
                    source.size_bytes(),
                    source.mime_type.clone(),
                    retrieval_url,
                );
                if current {
                    self.file.release();
                    self.transition(ProcessingStatus::Completed)?;
                }
                Ok(record)
            }
            Err(e) => {
                error!(file = %source.name, "Pinning failed: {}", e);
                if current {
                    self.transition(ProcessingStatus::Error)?;
                    self.error_message = Some(UPLOAD_FAILED_MESSAGE.to_string());
                }
                Err(e.into())
            }
        }
    }

    pub async fn submit(&mut self, service: &dyn PinningService) -> Result<UploadedFileRecord, SessionError> {
        let pending = self.begin_upload()?;
        let result = service.pin_file(pending.source()).await;
        self.complete_upload(pending, result)
    }

    /// Appends a record to the uploaded list and raises the transient success notice.
    pub fn record_upload(
        &mut self,
        name: String,
        size_bytes: u64,
        mime_type: String,
        retrieval_url: String,
    ) -> UploadedFileRecord {
        let record = UploadedFileRecord {
            name,
            size_bytes,
            mime_type,
            retrieval_url,
        };
        self.uploaded.push(record.clone());
        self.notice = Some(Notice {
            text: UPLOAD_SUCCEEDED_MESSAGE,
            raised_at: Instant::now(),
        });
        record
    }

    //=====================================================================================
    // Accessors
    //=====================================================================================

    pub fn status(&self) -> ProcessingStatus {
        self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// The success notice, or `None` once `NOTICE_DURATION` has passed since it was raised.
    pub fn success_message(&self) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|notice| notice.raised_at.elapsed() < NOTICE_DURATION)
            .map(|notice| notice.text)
    }

    pub fn uploaded_files(&self) -> &[UploadedFileRecord] {
        &self.uploaded
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.file.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PortError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const GATEWAY: &str = "https://gateway.pinata.cloud/ipfs/";

    struct FixedPinningService {
        result: PortResult<String>,
        calls: AtomicUsize,
    }

    impl FixedPinningService {
        fn hash(hash: &str) -> Self {
            Self {
                result: Ok(format!("{GATEWAY}{hash}")),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                result: Err(PortError::UploadFailed("status 401".into())),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PinningService for FixedPinningService {
        async fn pin_file(&self, _file: &FileSource) -> PortResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn report() -> FileSource {
        FileSource::new("report.pdf", "application/pdf", vec![0u8; 524_288])
    }

    #[test]
    fn transitions_follow_the_upload_cycle() {
        use ProcessingStatus::*;
        assert!(Idle.can_transition_to(Uploading));
        assert!(Uploading.can_transition_to(Completed));
        assert!(Uploading.can_transition_to(Error));
        assert!(Completed.can_transition_to(Idle));
        assert!(Error.can_transition_to(Idle));
        assert!(Error.can_transition_to(Uploading));

        assert!(!Idle.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Uploading));
        assert!(!Error.can_transition_to(Completed));
    }

    #[tokio::test(start_paused = true)]
    async fn successful_upload_is_listed_and_notice_expires() {
        let registry = PreviewRegistry::new();
        let service = FixedPinningService::hash("QmXYZ");
        let mut session = SharingSession::new(registry.clone());
        session.record_upload("earlier.txt".into(), 3, "text/plain".into(), format!("{GATEWAY}Qm0"));

        session.select_file(report());
        let record = session.submit(&service).await.unwrap();

        assert_eq!(record.retrieval_url, "https://gateway.pinata.cloud/ipfs/QmXYZ");
        assert_eq!(session.uploaded_files().last(), Some(&record));
        assert_eq!(record.name, "report.pdf");
        assert_eq!(record.size_bytes, 524_288);
        assert_eq!(record.mime_type, "application/pdf");
        assert_eq!(session.status(), ProcessingStatus::Completed);
        assert!(session.selected_file().is_none());
        assert_eq!(registry.live_count(), 0);

        assert_eq!(session.success_message(), Some(UPLOAD_SUCCEEDED_MESSAGE));
        tokio::time::advance(Duration::from_millis(1999)).await;
        assert_eq!(session.success_message(), Some(UPLOAD_SUCCEEDED_MESSAGE));
        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(session.success_message(), None);
        assert_eq!(session.uploaded_files().len(), 2);
    }

    #[tokio::test]
    async fn failed_upload_sets_the_error_state() {
        let service = FixedPinningService::failing();
        let mut session = SharingSession::new(PreviewRegistry::new());
        session.select_file(report());

        let err = session.submit(&service).await.unwrap_err();

        assert!(matches!(err, SessionError::Port(PortError::UploadFailed(_))));
        assert_eq!(session.status(), ProcessingStatus::Error);
        assert_eq!(session.error_message(), Some(UPLOAD_FAILED_MESSAGE));
        assert!(session.uploaded_files().is_empty());
        assert!(session.selected_file().is_some());
        assert_eq!(session.success_message(), None);
    }

    /// Fails the first `failures` calls, then pins under a fixed hash.
    struct FlakyPinningService {
        failures: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PinningService for FlakyPinningService {
        async fn pin_file(&self, _file: &FileSource) -> PortResult<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(PortError::UploadFailed("status 502".into()))
            } else {
                Ok(format!("{GATEWAY}QmRetry"))
            }
        }
    }

    #[tokio::test]
    async fn failed_upload_can_be_retried_without_reselecting() {
        let registry = PreviewRegistry::new();
        let service = FlakyPinningService {
            failures: 1,
            calls: AtomicUsize::new(0),
        };
        let mut session = SharingSession::new(registry.clone());
        session.select_file(report());

        session.submit(&service).await.unwrap_err();
        assert_eq!(session.status(), ProcessingStatus::Error);
        assert_eq!(session.error_message(), Some(UPLOAD_FAILED_MESSAGE));
        assert!(session.selected_file().is_some());

        let record = session.submit(&service).await.unwrap();

        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
        assert_eq!(record.retrieval_url, format!("{GATEWAY}QmRetry"));
        assert_eq!(session.uploaded_files(), std::slice::from_ref(&record));
        assert_eq!(session.status(), ProcessingStatus::Completed);
        assert_eq!(session.error_message(), None);
        assert!(session.selected_file().is_none());
        assert_eq!(registry.live_count(), 0);
    }

    #[tokio::test]
    async fn reselecting_after_an_error_clears_it() {
        let service = FixedPinningService::failing();
        let mut session = SharingSession::new(PreviewRegistry::new());
        session.select_file(report());
        session.submit(&service).await.unwrap_err();

        session.select_file(report());

        assert_eq!(session.status(), ProcessingStatus::Idle);
        assert_eq!(session.error_message(), None);
    }

    #[tokio::test]
    async fn submitting_without_a_file_asks_for_one() {
        let service = FixedPinningService::hash("QmXYZ");
        let mut session = SharingSession::new(PreviewRegistry::new());

        let err = session.submit(&service).await.unwrap_err();

        assert_eq!(err, SessionError::NoFileSelected);
        assert_eq!(session.error_message(), Some(NO_FILE_MESSAGE));
        assert_eq!(session.status(), ProcessingStatus::Idle);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn double_submit_is_rejected_while_uploading() {
        let mut session = SharingSession::new(PreviewRegistry::new());
        session.select_file(report());

        let pending = session.begin_upload().unwrap();
        assert_eq!(session.begin_upload().unwrap_err(), SessionError::UploadInProgress);
        assert_eq!(session.status(), ProcessingStatus::Uploading);

        session
            .complete_upload(pending, Ok(format!("{GATEWAY}Qm1")))
            .unwrap();
        assert_eq!(session.uploaded_files().len(), 1);
    }

    #[test]
    fn late_result_for_a_replaced_file_keeps_the_new_selection() {
        let registry = PreviewRegistry::new();
        let mut session = SharingSession::new(registry.clone());
        session.select_file(report());
        let pending = session.begin_upload().unwrap();

        session.select_file(FileSource::new("notes.txt", "text/plain", b"hi".to_vec()));
        assert_eq!(session.status(), ProcessingStatus::Idle);

        session
            .complete_upload(pending, Ok(format!("{GATEWAY}QmOld")))
            .unwrap();

        assert_eq!(session.uploaded_files()[0].name, "report.pdf");
        assert_eq!(session.status(), ProcessingStatus::Idle);
        assert_eq!(session.selected_file().map(|f| f.name()), Some("notes.txt"));
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn late_failure_for_a_replaced_file_does_not_touch_the_status() {
        let mut session = SharingSession::new(PreviewRegistry::new());
        session.select_file(report());
        let pending = session.begin_upload().unwrap();
        session.select_file(report());

        session
            .complete_upload(pending, Err(PortError::UploadFailed("timeout".into())))
            .unwrap_err();

        assert_eq!(session.status(), ProcessingStatus::Idle);
        assert_eq!(session.error_message(), None);
    }

    #[test]
    fn removing_the_file_resets_to_idle() {
        let registry = PreviewRegistry::new();
        let mut session = SharingSession::new(registry.clone());
        session.select_file(report());

        assert!(session.remove_file());

        assert_eq!(session.status(), ProcessingStatus::Idle);
        assert_eq!(registry.live_count(), 0);
    }
}
