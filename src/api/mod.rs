//! REST API module using Axum
//!
//! Serves the closure optimizer over HTTP under `/api/v1`, with every
//! response wrapped in the `{ data, meta }` / `{ error, meta }` envelope.

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::ApiState;

use axum::http::{header, Method};
use axum::middleware;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted request body (inline well lists included).
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `WELL_CLOSURE_CORS_ORIGINS` to a comma-separated list of allowed
/// origins for browser front-ends served elsewhere.
fn build_cors_layer() -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    match std::env::var("WELL_CLOSURE_CORS_ORIGINS") {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            base.allow_origin(allowed)
        }
        Err(_) => base,
    }
}

/// Concurrent searches allowed: one per available core.
fn max_concurrent_searches() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

/// Create the complete application router.
pub fn create_app(state: ApiState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes(state, max_concurrent_searches()))
        .fallback(handlers::not_found)
        // Middleware
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(middleware::map_response(envelope::envelope_rejections))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}
