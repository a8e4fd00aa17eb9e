//! HTTP handlers.

pub mod health_handler;
pub mod vehicle_handler;

pub use health_handler::health_routes;
pub use vehicle_handler::vehicle_routes;
