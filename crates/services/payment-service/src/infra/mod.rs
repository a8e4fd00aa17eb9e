//! Infrastructure layer - migrations, transaction management and the card gateway.

mod gateway;
pub mod migrations;
mod unit_of_work;

pub use gateway::{PaymentGateway, SimulatedGateway};
pub use migrations::Migrator;
pub use unit_of_work::{Persistence, TxFuture, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use gateway::MockPaymentGateway;
