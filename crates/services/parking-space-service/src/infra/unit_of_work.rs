//! Unit of Work for the parking space table.
//!
//! Every mutating operation runs read-guard-write inside one transaction;
//! rows read by id inside it are locked until commit or rollback.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use sea_orm::{AccessMode, DatabaseConnection, IsolationLevel, TransactionTrait};

use crate::repository::{ParkingSpaceRepository, ParkingSpaceStore, TxParkingSpaceRepository};
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
    fn parking_spaces(&self) -> Arc<dyn ParkingSpaceRepository>;

    /// Run `f` in a read-committed transaction.
    ///
    /// Commits when `f` returns `Ok`, rolls back otherwise.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a dyn ParkingSpaceRepository) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    parking_space_repo: Arc<ParkingSpaceStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        let parking_space_repo = Arc::new(ParkingSpaceStore::new(db.clone()));
        Self {
            db,
            parking_space_repo,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn parking_spaces(&self) -> Arc<dyn ParkingSpaceRepository> {
        self.parking_space_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a dyn ParkingSpaceRepository) -> TxFuture<'a, T> + Send,
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
            let repo = TxParkingSpaceRepository::new(&txn);
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
