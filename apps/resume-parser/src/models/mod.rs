pub mod extraction;

pub use extraction::{ContactInfo, ExtractedEntities, ExtractionResult, UploadedDocument};
