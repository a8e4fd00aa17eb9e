//! Application state for dependency injection.

use std::sync::Arc;

use common::Database;

use crate::service::ParkingSpaceService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub parking_spaces: Arc<dyn ParkingSpaceService>,
    /// Used by the health check; absent in router tests
    pub db: Option<Database>,
}

impl AppState {
    /// Create new app state.
    pub fn new(parking_spaces: Arc<dyn ParkingSpaceService>, db: Option<Database>) -> Self {
        Self { parking_spaces, db }
    }
}
