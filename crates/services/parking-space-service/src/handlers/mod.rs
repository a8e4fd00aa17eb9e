//! HTTP handlers.

pub mod health_handler;
pub mod parking_space_handler;

pub use health_handler::health_routes;
pub use parking_space_handler::parking_space_routes;
