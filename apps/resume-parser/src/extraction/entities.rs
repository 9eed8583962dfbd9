//! Buckets recognized entities into résumé sections.
//!
//! Organizations are reported as education and dates as work experience.
//! Neither mapping is exact; an employer is also an organization and a
//! graduation year is also a date.

use tracing::trace;

use crate::models::ExtractedEntities;
use crate::ner::{EntityRecognizer, RecognizedEntity};

pub fn extract_entities(text: &str, recognizer: &dyn EntityRecognizer) -> ExtractedEntities {
    let mut entities = ExtractedEntities::default();
    for entity in recognizer.recognize(text) {
        match entity {
            RecognizedEntity::Organization(span) => entities.education.push(span),
            RecognizedEntity::Date(span) => entities.work_experience.push(span),
            other @ RecognizedEntity::Other { .. } => {
                trace!(entity = other.text(), "Skipping entity outside the extracted categories");
            }
        }
    }
    entities
}
