//! Health check handlers.

use axum::{extract::State, response::Response, routing::get, Router};

use common::health_report;

use crate::state::AppState;

/// Create health routes.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// Health check endpoint - verifies database connectivity.
pub async fn health_check(State(state): State<AppState>) -> Response {
    health_report("parking-space-service", state.db.as_ref()).await
}
