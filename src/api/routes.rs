//! API route definitions
//!
//! - GET  /api/v1/health   - liveness and loaded table size
//! - GET  /api/v1/wells    - producing wells, optionally filtered by field
//! - POST /api/v1/optimize - minimum-loss closure plan for a target flow

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;

use super::handlers::{self, ApiState};

/// Create all API routes.
///
/// Searches are CPU-bound, so at most `max_concurrent_searches` run at once;
/// further requests wait for a slot.
pub fn api_routes(state: ApiState, max_concurrent_searches: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/wells", get(handlers::list_wells))
        .route(
            "/optimize",
            post(handlers::optimize).layer(ConcurrencyLimitLayer::new(max_concurrent_searches)),
        )
        .with_state(state)
}
