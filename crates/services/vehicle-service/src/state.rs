//! Application state for dependency injection.

use std::sync::Arc;

use common::Database;

use crate::service::VehicleService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub vehicles: Arc<dyn VehicleService>,
    pub db: Option<Database>,
}

impl AppState {
    pub fn new(vehicles: Arc<dyn VehicleService>, db: Option<Database>) -> Self {
        Self { vehicles, db }
    }
}
