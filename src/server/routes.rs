//! Router configuration for the audit API.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Single-page audit (synchronous)
        .route("/audit/page", post(handlers::audit_page))
        // Domain audit job lifecycle
        .route("/audit/domain", post(handlers::audit_domain))
        .route(
            "/audit/domain/progress/:job_id",
            get(handlers::domain_progress),
        )
        .route("/audit/domain/result/:job_id", get(handlers::domain_result))
        .route("/audit/domain/:job_id", delete(handlers::cancel_domain))
        // Report rendering (external renderer capability)
        .route("/audit/pdf", post(handlers::render_report))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
