//! v2 API route table.

use axum::routing::get;
use axum::Router;

use super::handlers::{self, DashboardState};

/// Build the v2 API router.
pub fn v2_api_routes(state: DashboardState) -> Router {
    Router::new()
        // Service
        .route("/system/health", get(handlers::system_health))
        .route("/status", get(handlers::status))
        // Series
        .route("/countries", get(handlers::countries))
        .route("/infected", get(handlers::infected))
        .route("/deaths", get(handlers::deaths))
        .route("/cfr", get(handlers::case_fatality_rate))
        .route("/map", get(handlers::map))
        // Model
        .route("/forecast/:country", get(handlers::forecast))
        .with_state(state)
}
