//! Extraction pipeline: PDF bytes → text → contact info + entity sections.

pub mod contact;
pub mod entities;
pub mod pdf_text;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::models::ExtractionResult;
use crate::ner::EntityRecognizer;

pub use pdf_text::DocumentParseError;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to read stored document {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    DocumentParse(#[from] DocumentParseError),

    #[error("Extraction task failed: {0}")]
    Worker(String),
}

/// Runs the full pipeline. Cheap to clone; the recognizer is shared.
#[derive(Clone)]
pub struct ResumeExtractor {
    recognizer: Arc<dyn EntityRecognizer>,
}

impl ResumeExtractor {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self { recognizer }
    }

    pub fn recognizer_name(&self) -> &'static str {
        self.recognizer.name()
    }

    /// Contact and entity extraction over already-extracted text.
    pub fn analyze_text(&self, text: &str) -> ExtractionResult {
        ExtractionResult {
            contact: contact::extract_contact_info(text),
            entities: entities::extract_entities(text, self.recognizer.as_ref()),
        }
    }

    pub fn extract_from_bytes(&self, bytes: &[u8]) -> Result<ExtractionResult, DocumentParseError> {
        let text = pdf_text::extract_text(bytes)?;
        debug!("Extracted {} characters of text", text.chars().count());
        Ok(self.analyze_text(&text))
    }

    /// Reads a stored upload and runs the pipeline on the blocking pool.
    pub async fn extract_from_file(&self, path: &Path) -> Result<ExtractionResult, ExtractionError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ExtractionError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let extractor = self.clone();
        let result = tokio::task::spawn_blocking(move || extractor.extract_from_bytes(&bytes))
            .await
            .map_err(|e| ExtractionError::Worker(e.to_string()))??;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ner::PatternRecognizer;
    use crate::test_support::{image_only_pdf, pdf_with_pages};

    fn extractor() -> ResumeExtractor {
        ResumeExtractor::new(Arc::new(PatternRecognizer::new().unwrap()))
    }

    #[test]
    fn test_analyze_text_combines_both_extractors() {
        let result = extractor().analyze_text(
            "Jane Doe | 5551234567 | jane@example.com\n\
             Acme Corp, Jan 2020 - Present\n\
             Stanford University, 2015 - 2019",
        );
        assert_eq!(result.contact.phone.as_deref(), Some("5551234567"));
        assert_eq!(result.contact.email.as_deref(), Some("jane@example.com"));
        assert_eq!(result.entities.education, vec!["Acme Corp", "Stanford University"]);
        assert_eq!(
            result.entities.work_experience,
            vec!["Jan 2020 - Present", "2015 - 2019"]
        );
    }

    #[test]
    fn test_empty_text_yields_empty_result() {
        assert!(extractor().analyze_text("").is_empty());
    }

    #[test]
    fn test_extract_from_bytes() {
        let pdf = pdf_with_pages(&["Call me at 5551234567 or email jane@example.com"]);
        let result = extractor().extract_from_bytes(&pdf).unwrap();
        assert_eq!(result.contact.phone.as_deref(), Some("5551234567"));
        assert_eq!(result.contact.email.as_deref(), Some("jane@example.com"));
    }

    #[test]
    fn test_image_only_pdf_yields_empty_result() {
        let result = extractor().extract_from_bytes(&image_only_pdf()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_malformed_pdf_is_a_parse_error() {
        assert!(extractor().extract_from_bytes(b"%PDF-1.4 garbage").is_err());
    }

    #[tokio::test]
    async fn test_extract_from_file_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        std::fs::write(
            &path,
            pdf_with_pages(&["Globex Corporation 2016 - 2019", "contact: a.b@globex.com"]),
        )
        .unwrap();

        let extractor = extractor();
        let first = extractor.extract_from_file(&path).await.unwrap();
        let second = extractor.extract_from_file(&path).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.contact.email.as_deref(), Some("a.b@globex.com"));
    }

    #[tokio::test]
    async fn test_missing_file_is_a_read_error() {
        let err = extractor()
            .extract_from_file(Path::new("/no/such/upload.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Read { .. }));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();
        let err = extractor().extract_from_file(&path).await.unwrap_err();
        assert!(matches!(err, ExtractionError::DocumentParse(_)));
    }
}
