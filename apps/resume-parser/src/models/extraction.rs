use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A single uploaded file as received from the multipart form.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// Filename as declared by the client. Untrusted; sanitize before use.
    pub file_name: String,
    pub bytes: Bytes,
}

/// Phone and email found in the document. First match of each wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Entity spans bucketed by category, in recognizer discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    /// Organization-like spans.
    pub education: Vec<String>,
    /// Date-like spans.
    pub work_experience: Vec<String>,
}

/// Everything rendered back to the client for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub contact: ContactInfo,
    pub entities: ExtractedEntities,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.contact.phone.is_none()
            && self.contact.email.is_none()
            && self.entities.education.is_empty()
            && self.entities.work_experience.is_empty()
    }
}
