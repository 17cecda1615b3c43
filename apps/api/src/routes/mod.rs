pub mod health;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/upload", post(upload::upload_resume))
        // Slightly above the documented ceiling so the handler's explicit
        // size check owns the 413 response.
        .layer(DefaultBodyLimit::max(upload::MAX_UPLOAD_BYTES + 1024 * 1024))
        .with_state(state)
}
