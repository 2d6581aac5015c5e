//! Multipart upload reading and on-disk storage of uploaded PDFs.
//!
//! Files are written under the upload directory using the client-supplied
//! filename as-is. Two uploads with the same filename overwrite each other,
//! and files are never cleaned up.

use std::path::{Path, PathBuf};

use actix_multipart::Multipart;
use futures::StreamExt as _;
use nephro_coach_server_models::ValidationError;

use crate::error::ServiceError;

/// A file part read from a multipart request.
#[derive(Debug)]
pub struct UploadedFile {
    /// Client-supplied filename.
    pub filename: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Reads the part named `field_name` from a multipart body. Other parts are
/// skipped.
///
/// # Errors
///
/// * [`ValidationError::MissingFile`] if no part has that name
/// * [`ValidationError::MissingFilename`] if the part has no filename
/// * [`ServiceError::Multipart`] if the body is malformed
pub async fn read_file_field(
    mut payload: Multipart,
    field_name: &'static str,
) -> Result<UploadedFile, ServiceError> {
    while let Some(field) = payload.next().await {
        let mut field = field.map_err(|e| ServiceError::Multipart(e.to_string()))?;

        if field.name() != Some(field_name) {
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or(ValidationError::MissingFilename)?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| ServiceError::Multipart(e.to_string()))?;
            bytes.extend_from_slice(&chunk);
        }

        log::debug!("Received upload '{filename}' ({} bytes)", bytes.len());

        return Ok(UploadedFile { filename, bytes });
    }

    Err(ValidationError::MissingFile(field_name).into())
}

/// Writes `bytes` to `dir/filename`, creating `dir` if needed, and returns
/// the written path.
///
/// # Errors
///
/// Returns an I/O error if the directory or file cannot be written.
pub async fn save_upload(dir: &Path, filename: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(filename);
    tokio::fs::write(&path, bytes).await?;

    log::debug!("Saved upload to {}", path.display());

    Ok(path)
}
