pub mod local_file;
pub mod pinata;
pub mod query_api;

pub use local_file::load_file;
pub use pinata::PinataAdapter;
pub use query_api::HttpQueryAdapter;

use docdesk_core::domain::FileSource;
use docdesk_core::ports::PortError;
use reqwest::multipart::{Form, Part};
use tracing::debug;

const OCTET_STREAM: &str = "application/octet-stream";

/// Builds the single-field multipart body (`file`) both upload endpoints expect.
///
/// Files without a usable MIME type are sent as `application/octet-stream`.
pub(crate) fn file_form(file: &FileSource) -> Result<Form, PortError> {
    let part = || Part::bytes(file.contents.to_vec()).file_name(file.name.clone());

    let part = match part().mime_str(&file.mime_type) {
        Ok(part) => part,
        Err(_) => {
            debug!(file = %file.name, mime = %file.mime_type, "Unusable MIME type, sending as octet-stream");
            part()
                .mime_str(OCTET_STREAM)
                .map_err(|e| PortError::UploadFailed(e.to_string()))?
        }
    };
    Ok(Form::new().part("file", part))
}

/// Reads the body of an unsuccessful response for the error message.
pub(crate) async fn describe_failure(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if body.is_empty() {
        format!("status {}", status)
    } else {
        format!("status {}: {}", status, body)
    }
}
