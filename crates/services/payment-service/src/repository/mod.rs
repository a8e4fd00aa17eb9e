//! Repository layer for data access.

pub mod entities;
mod payment_repository;

pub use payment_repository::{PaymentRepository, PaymentStore, TxPaymentRepository};

#[cfg(any(test, feature = "test-utils"))]
pub use payment_repository::MockPaymentRepository;
