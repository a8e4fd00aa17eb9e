//! Service layer - parking space use cases.

mod parking_space_service;

pub use parking_space_service::{ParkingSpaceManager, ParkingSpaceService};
