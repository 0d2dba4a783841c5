//! REST API module using Axum
//!
//! JSON endpoints for the dashboard, all under `/api/v2` and all wrapped in
//! the envelope from [`envelope`].

pub mod envelope;
pub mod handlers;
mod v2_routes;

pub use handlers::DashboardState;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `EPICAST_CORS_ORIGINS` to a comma-separated list of allowed origins
/// for a separately hosted frontend (e.g. `http://localhost:5173`).
fn build_cors_layer() -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);
    match std::env::var("EPICAST_CORS_ORIGINS") {
        Ok(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            base.allow_origin(allowed)
        }
        Err(_) => base,
    }
}

/// Create the complete application router.
pub fn create_app(state: DashboardState) -> Router {
    Router::new()
        .nest("/api/v2", v2_routes::v2_api_routes(state))
        .fallback(envelope::route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(build_cors_layer())
}
