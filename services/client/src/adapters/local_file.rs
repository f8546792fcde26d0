//! services/client/src/adapters/local_file.rs
//!
//! Stands in for the browser file picker: reads a file from disk into a `FileSource`.

use std::path::Path;

use docdesk_core::domain::FileSource;

use crate::error::ClientError;

/// Reads `path` and guesses its MIME type from the extension.
pub async fn load_file(path: &Path) -> Result<FileSource, ClientError> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ClientError::Internal(format!("'{}' does not name a file", path.display())))?;

    let contents = tokio::fs::read(path).await?;
    let mime_type = mime_guess::from_path(path).first_or_octet_stream();

    Ok(FileSource::new(name, mime_type.essence_str(), contents))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_name_size_and_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        tokio::fs::write(&path, vec![7u8; 2048]).await.unwrap();

        let file = load_file(&path).await.unwrap();

        assert_eq!(file.name, "report.pdf");
        assert_eq!(file.size_bytes(), 2048);
        assert_eq!(file.mime_type, "application/pdf");
    }

    #[tokio::test]
    async fn unknown_extensions_fall_back_to_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.zzqx");
        tokio::fs::write(&path, b"data").await.unwrap();

        let file = load_file(&path).await.unwrap();

        assert_eq!(file.mime_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn missing_files_are_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.pdf")).await.unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }
}
