//! Repository layer for data access.

pub mod entities;
mod parking_space_repository;

pub use parking_space_repository::{
    ParkingSpaceRepository, ParkingSpaceStore, TxParkingSpaceRepository,
};

#[cfg(any(test, feature = "test-utils"))]
pub use parking_space_repository::MockParkingSpaceRepository;
