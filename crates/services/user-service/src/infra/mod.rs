//! Infrastructure layer - migrations, password hashing and transaction management.

mod hasher;
pub mod migrations;
mod unit_of_work;

pub use hasher::{Argon2Hasher, PasswordHasher};
pub use migrations::Migrator;
pub use unit_of_work::{Persistence, TxFuture, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use hasher::MockPasswordHasher;
