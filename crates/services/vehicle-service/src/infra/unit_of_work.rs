//! Unit of Work for the vehicles table.
//!
//! Every mutating operation runs read-guard-write inside one transaction;
//! rows read by id inside it are locked until commit or rollback.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use sea_orm::{AccessMode, DatabaseConnection, IsolationLevel, TransactionTrait};

use crate::repository::{TxVehicleRepository, VehicleRepository, VehicleStore};
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
    fn vehicles(&self) -> Arc<dyn VehicleRepository>;

    /// Run `f` in a read-committed transaction.
    ///
    /// Commits when `f` returns `Ok`, rolls back otherwise.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a dyn VehicleRepository) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    vehicle_repo: Arc<VehicleStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        let vehicle_repo = Arc::new(VehicleStore::new(db.clone()));
        Self { db, vehicle_repo }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn vehicles(&self) -> Arc<dyn VehicleRepository> {
        self.vehicle_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a dyn VehicleRepository) -> TxFuture<'a, T> + Send,
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
            let repo = TxVehicleRepository::new(&txn);
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
