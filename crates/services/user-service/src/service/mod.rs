//! Service layer - business logic.

mod user_service;

pub use user_service::{Registration, UserManager, UserService};
