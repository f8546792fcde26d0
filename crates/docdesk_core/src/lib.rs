pub mod domain;
pub mod ports;
pub mod preview;
pub mod sessions;

pub use domain::{format_file_size, FileSource, Message, Role, SelectedFile, SessionHandle, UploadedFileRecord};
pub use ports::{DocumentQueryService, PinningService, PortError, PortResult};
pub use preview::{FileSlot, PreviewHandle, PreviewRegistry};
pub use sessions::{PendingUpload, ProcessingStatus, QuerySession, SendOutcome, SessionError, SharingSession};
