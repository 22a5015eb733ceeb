pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::polling::handlers as results;
use crate::proxy;
use crate::state::AppState;
use crate::submission::handlers as submission;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Submission view
        .route("/", get(submission::handle_home))
        .route("/submit", post(submission::handle_submit))
        // Results view
        .route("/results/:job_id", get(results::handle_results_page))
        .route("/results/:job_id/events", get(results::handle_results_events))
        // Same-origin pass-through to the backend
        .route("/api/proxy-upload", post(proxy::handle_proxy_upload))
        .route("/api/proxy-evaluate", post(proxy::handle_proxy_evaluate))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
