//! Unit of Work for the payments table.
//!
//! Every mutating operation runs read-guard-write inside one transaction;
//! rows read by id inside it are locked until commit or rollback.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use sea_orm::{AccessMode, DatabaseConnection, IsolationLevel, TransactionTrait};

use crate::repository::{PaymentRepository, PaymentStore, TxPaymentRepository};
use common::{AppError, AppResult};

/// Future returned by a transaction body, borrowing the transactional repository
pub type TxFuture<'a, T> = BoxFuture<'a, AppResult<T>>;

/// Unit of Work trait for dependency injection.
///
/// Not object safe because of the generic `transaction`; services are generic
/// over it instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Repository for reads outside a transaction
    fn payments(&self) -> Arc<dyn PaymentRepository>;

    /// Run `f` in a read-committed transaction.
    ///
    /// Commits when `f` returns `Ok`, rolls back otherwise.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a dyn PaymentRepository) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    payment_repo: Arc<PaymentStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        let payment_repo = Arc::new(PaymentStore::new(db.clone()));
        Self { db, payment_repo }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn payments(&self) -> Arc<dyn PaymentRepository> {
        self.payment_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a dyn PaymentRepository) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await
            .map_err(AppError::from)?;

        let result = {
            let repo = TxPaymentRepository::new(&txn);
            f(&repo).await
        };

        match result {
            Ok(value) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}
