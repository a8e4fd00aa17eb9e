//! SeaORM entities.

pub mod vehicle;
