//! Infrastructure layer - migrations and transaction management.

pub mod migrations;
mod unit_of_work;

pub use migrations::Migrator;
pub use unit_of_work::{Persistence, TxFuture, UnitOfWork};
