mod config;
mod errors;
mod extraction;
mod models;
mod ner;
mod render;
mod routes;
mod state;
mod storage;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::ResumeExtractor;
use crate::ner::load_recognizer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::UploadStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (malformed env vars abort startup)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Parser v{}", env!("CARGO_PKG_VERSION"));

    // Upload directory
    let uploads = UploadStore::new(&config.upload_dir, config.unique_upload_names);
    uploads.ensure_dir().await?;

    // Entity recognizer, loaded once and shared read-only
    let recognizer = load_recognizer(&config).context("Failed to load entity recognizer")?;

    let state = AppState {
        uploads,
        extractor: ResumeExtractor::new(recognizer),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS once the form is served from a fixed origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
