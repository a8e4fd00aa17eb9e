//! Health check handlers.

use axum::{extract::State, response::Response, routing::get, Router};

use common::health_report;

use crate::config::SERVICE_NAME;
use crate::state::AppState;

/// Create health routes.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// Health check endpoint - verifies database connectivity.
pub async fn health_check(State(state): State<AppState>) -> Response {
    health_report(SERVICE_NAME, state.db.as_ref()).await
}
