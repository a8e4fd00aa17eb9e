//! Service layer - business logic.

mod vehicle_service;

pub use vehicle_service::{VehicleManager, VehicleService};
