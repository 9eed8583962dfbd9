//! Upload directory management.
//!
//! By default an upload is stored under its sanitized filename, so two
//! uploads with the same name overwrite each other. With unique naming
//! enabled every stored file gets a UUID prefix instead.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::UploadedDocument;

/// Stored name used when sanitizing leaves nothing usable.
const FALLBACK_FILE_NAME: &str = "upload.pdf";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create upload directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write upload {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    unique_names: bool,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, unique_names: bool) -> Self {
        Self {
            dir: dir.into(),
            unique_names,
        }
    }

    /// Creates the upload directory (and parents) if it does not exist.
    pub async fn ensure_dir(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: self.dir.clone(),
                source,
            })?;
        info!("Upload directory ready at {}", self.dir.display());
        Ok(())
    }

    /// Where an upload declared as `file_name` would be written.
    pub fn storage_path(&self, file_name: &str) -> PathBuf {
        let name = stored_file_name(file_name);
        if self.unique_names {
            self.dir.join(format!("{}-{name}", Uuid::new_v4()))
        } else {
            self.dir.join(name)
        }
    }

    /// Writes the document verbatim and returns the stored path.
    pub async fn save(&self, document: &UploadedDocument) -> Result<PathBuf, StorageError> {
        let path = self.storage_path(&document.file_name);
        tokio::fs::write(&path, &document.bytes)
            .await
            .map_err(|source| StorageError::Write {
                path: path.clone(),
                source,
            })?;
        debug!("Stored {} bytes at {}", document.bytes.len(), path.display());
        Ok(path)
    }
}

/// Whether the declared filename has a `.pdf` extension (any case).
pub fn is_pdf_filename(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
}

/// Reduces a client-supplied filename to a safe single path component.
///
/// Path separators become spaces, whitespace runs become `_`, anything
/// outside ASCII `[A-Za-z0-9_.-]` is dropped and leading/trailing `.`/`_`
/// are stripped. The result may be empty.
pub fn sanitize_filename(file_name: &str) -> String {
    let spaced = file_name.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(['.', '_'])
        .to_string()
}

fn stored_file_name(file_name: &str) -> String {
    let sanitized = sanitize_filename(file_name);
    if is_pdf_filename(&sanitized) && sanitized.len() > ".pdf".len() {
        sanitized
    } else {
        FALLBACK_FILE_NAME.to_string()
    }
}
