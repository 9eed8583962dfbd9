//! Named-entity recognition backends.
//!
//! A recognizer is loaded once at startup by [`load_recognizer`] and shared
//! read-only across all requests as an `Arc<dyn EntityRecognizer>`.

#[cfg(feature = "bert")]
pub mod bert;
pub mod pattern;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::config::{Config, NerBackend};

pub use pattern::PatternRecognizer;

/// An entity span tagged with its predicted category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizedEntity {
    Organization(String),
    Date(String),
    /// Any category the extraction pipeline does not use (person, location, ...).
    Other { label: String, text: String },
}

impl RecognizedEntity {
    /// Maps a recognizer label (`ORG`, `DATE`, `PER`, ...) onto a tagged entity.
    #[cfg_attr(not(feature = "bert"), allow(dead_code))]
    pub fn from_label(label: &str, text: impl Into<String>) -> Self {
        let text = text.into();
        match label.to_ascii_uppercase().as_str() {
            "ORG" | "ORGANIZATION" => RecognizedEntity::Organization(text),
            "DATE" => RecognizedEntity::Date(text),
            other => RecognizedEntity::Other {
                label: other.to_string(),
                text,
            },
        }
    }

    pub fn text(&self) -> &str {
        match self {
            RecognizedEntity::Organization(text)
            | RecognizedEntity::Date(text)
            | RecognizedEntity::Other { text, .. } => text,
        }
    }
}

/// A general-purpose entity recognizer.
///
/// Implementations must be deterministic and must always return, yielding an
/// empty vector when nothing is recognized. Entities are returned in
/// discovery order (left to right through the text).
pub trait EntityRecognizer: Send + Sync {
    /// Short backend identifier, reported by `/health`.
    fn name(&self) -> &'static str;

    fn recognize(&self, text: &str) -> Vec<RecognizedEntity>;
}

#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("Failed to read gazetteer {path}: {source}")]
    GazetteerRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid gazetteer {path}: {source}")]
    GazetteerFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid recognizer pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[cfg_attr(not(feature = "bert"), allow(dead_code))]
    #[error("Failed to load NER model: {0}")]
    ModelLoad(String),

    #[error("NER backend '{0}' is not compiled in; rebuild with `--features {0}`")]
    BackendUnavailable(&'static str),
}

/// Loads the configured recognizer. Any error here is fatal at startup.
pub fn load_recognizer(config: &Config) -> Result<Arc<dyn EntityRecognizer>, RecognizerError> {
    let recognizer: Arc<dyn EntityRecognizer> = match config.ner_backend {
        NerBackend::Pattern => {
            let recognizer = match &config.ner_gazetteer {
                Some(path) => PatternRecognizer::with_gazetteer_file(path)?,
                None => PatternRecognizer::new()?,
            };
            Arc::new(recognizer)
        }
        NerBackend::Bert => load_bert(config)?,
    };

    info!("Entity recognizer loaded (backend: {})", recognizer.name());
    Ok(recognizer)
}

#[cfg(feature = "bert")]
fn load_bert(config: &Config) -> Result<Arc<dyn EntityRecognizer>, RecognizerError> {
    info!("Loading BERT NER model from {}", config.ner_model_repo);
    Ok(Arc::new(bert::BertRecognizer::load(&config.ner_model_repo)?))
}

#[cfg(not(feature = "bert"))]
fn load_bert(_config: &Config) -> Result<Arc<dyn EntityRecognizer>, RecognizerError> {
    Err(RecognizerError::BackendUnavailable("bert"))
}
