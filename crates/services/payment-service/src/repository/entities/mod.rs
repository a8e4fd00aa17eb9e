//! SeaORM entities.

pub mod payment;
