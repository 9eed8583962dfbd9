pub mod health;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/", get(upload::upload_form))
        .route("/upload", post(upload::handle_upload))
        .route("/health", get(health::health_handler))
        .route("/api/v1/resumes/parse", post(upload::handle_parse_api))
        .layer(body_limit)
        .with_state(state)
}
