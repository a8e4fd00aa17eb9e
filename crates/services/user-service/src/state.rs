//! Application state for dependency injection.

use std::sync::Arc;

use common::Database;

use crate::service::UserService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserService>,
    pub db: Option<Database>,
}

impl AppState {
    pub fn new(users: Arc<dyn UserService>, db: Option<Database>) -> Self {
        Self { users, db }
    }
}
