use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session control
        .route("/interviews/start", post(handlers::start_interview))
        .route("/interviews/stop", post(handlers::stop_interview))
        // Session queries
        .route("/interviews/status", get(handlers::get_interview_status))
        .route("/interviews/transcript", get(handlers::get_interview_transcript))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        // The interview UI is served from another origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
