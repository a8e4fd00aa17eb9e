//! HTTP handlers.

pub mod health_handler;
pub mod payment_handler;
pub mod payment_v1_handler;

pub use health_handler::health_routes;
pub use payment_handler::payment_routes;
pub use payment_v1_handler::payment_v1_routes;
