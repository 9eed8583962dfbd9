//! PDF → plain text.

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;
use tracing::debug;

/// The byte stream is not a PDF this service can read (corrupt structure,
/// encrypted without a usable password, ...).
#[derive(Debug, Error)]
#[error("Failed to parse PDF document: {reason}")]
pub struct DocumentParseError {
    reason: String,
}

impl DocumentParseError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Extracts the text of every page, in page order.
///
/// Pages without a text layer (scanned images) come back empty or
/// whitespace-only; that is not an error.
pub fn page_texts(bytes: &[u8]) -> Result<Vec<String>, DocumentParseError> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));

    match outcome {
        Ok(Ok(pages)) => {
            debug!("Extracted text from {} PDF page(s)", pages.len());
            Ok(pages)
        }
        Ok(Err(e)) => Err(DocumentParseError::new(e.to_string())),
        Err(payload) => Err(DocumentParseError::new(format!(
            "PDF parser aborted: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

/// Concatenates the text of all pages. No separator is inserted between
/// pages; a zero-page document yields the empty string.
pub fn extract_text(bytes: &[u8]) -> Result<String, DocumentParseError> {
    Ok(page_texts(bytes)?.concat())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
