//! Repository layer for data access.

pub mod entities;
mod vehicle_repository;

pub use vehicle_repository::{TxVehicleRepository, VehicleRepository, VehicleStore};

#[cfg(any(test, feature = "test-utils"))]
pub use vehicle_repository::MockVehicleRepository;
