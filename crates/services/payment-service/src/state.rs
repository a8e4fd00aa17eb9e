//! Application state for dependency injection.

use std::sync::Arc;

use common::Database;

use crate::service::PaymentService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub payments: Arc<dyn PaymentService>,
    /// Used by the health check; absent in router tests
    pub db: Option<Database>,
}

impl AppState {
    pub fn new(payments: Arc<dyn PaymentService>, db: Option<Database>) -> Self {
        Self { payments, db }
    }
}
