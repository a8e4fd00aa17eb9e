//! SeaORM entities.

pub mod parking_space;
