pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // AI relay
        .route("/api/v1/ai/:target/stream", post(handlers::handle_stream))
        // Resume analysis
        .route(
            "/api/v1/resumes/analyze",
            post(handlers::handle_analyze_resume).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/analyses/:id", get(handlers::handle_get_analysis))
        .with_state(state)
}
