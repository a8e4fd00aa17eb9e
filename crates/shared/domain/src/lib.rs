//! Domain layer - Core parking entities and their state machines.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Every entity is an immutable snapshot; transitions consume a snapshot and
//! return the next one, leaving persistence to the owning service.

pub mod constants;
pub mod error;
pub mod money;
pub mod parking_space;
pub mod password;
pub mod payment;
pub mod user;
pub mod vehicle;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use money::check_hourly_rate;
pub use parking_space::{NewParkingSpace, ParkingSpace, ParkingSpaceUpdate, ParkingStatus};
pub use password::Password;
pub use payment::{
    CardDetails, NewPayment, Payment, PaymentMethod, PaymentRequest, PaymentStatus, Receipt,
    StatusChange,
};
pub use user::{NewUser, User, UserType, UserUpdate};
pub use vehicle::{NewVehicle, Vehicle, VehicleType, VehicleUpdate};
