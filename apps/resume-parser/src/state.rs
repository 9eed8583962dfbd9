use crate::config::Config;
use crate::extraction::ResumeExtractor;
use crate::storage::UploadStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub uploads: UploadStore,
    /// Holds the recognizer loaded once at startup; read-only afterwards.
    pub extractor: ResumeExtractor,
}
