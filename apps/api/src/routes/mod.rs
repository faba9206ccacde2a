pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching API
        .route(
            "/api/v1/jobs/:id/matches",
            get(handlers::handle_candidate_matches),
        )
        .route(
            "/api/v1/candidates/:id/matches",
            get(handlers::handle_job_matches),
        )
        // Boundary writes
        .route("/api/v1/jobs", post(handlers::handle_create_job))
        .route("/api/v1/interviews", post(handlers::handle_create_interview))
        // Cache introspection
        .route("/api/v1/matches/cache", get(handlers::handle_cache_stats))
        .route(
            "/api/v1/matches/cache/clear",
            post(handlers::handle_cache_clear),
        )
        .with_state(state)
}
