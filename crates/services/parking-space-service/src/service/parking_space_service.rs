//! Parking space service - reservation state machine and uniqueness checks.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use common::{AppError, AppResult, Clock, OptionExt, SystemClock};
use domain::{NewParkingSpace, ParkingSpace, ParkingSpaceUpdate, ParkingStatus};

use crate::infra::UnitOfWork;

/// Parking space service trait for dependency injection.
#[async_trait]
pub trait ParkingSpaceService: Send + Sync {
    async fn get_space(&self, id: i64) -> AppResult<ParkingSpace>;

    async fn get_by_space_number(&self, space_number: &str) -> AppResult<ParkingSpace>;

    async fn list_spaces(&self) -> AppResult<Vec<ParkingSpace>>;

    async fn list_available(&self) -> AppResult<Vec<ParkingSpace>>;

    async fn list_by_city(&self, city: &str) -> AppResult<Vec<ParkingSpace>>;

    async fn list_by_zone(&self, zone: &str) -> AppResult<Vec<ParkingSpace>>;

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<ParkingSpace>>;

    async fn list_available_in(&self, city: &str, zone: &str) -> AppResult<Vec<ParkingSpace>>;

    /// Number of AVAILABLE spaces in `city`
    async fn available_count(&self, city: &str) -> AppResult<u64>;

    /// Create a space; the space number must be unused
    async fn create_space(&self, space: NewParkingSpace) -> AppResult<ParkingSpace>;

    /// Replace location, zone, city, rate and status
    async fn update_space(&self, id: i64, update: ParkingSpaceUpdate) -> AppResult<ParkingSpace>;

    /// AVAILABLE -> RESERVED for `duration_hours`
    async fn reserve(&self, id: i64, duration_hours: i64) -> AppResult<ParkingSpace>;

    /// Any status -> AVAILABLE
    async fn release(&self, id: i64) -> AppResult<ParkingSpace>;

    /// AVAILABLE or RESERVED -> OCCUPIED
    async fn occupy(&self, id: i64) -> AppResult<ParkingSpace>;

    async fn delete_space(&self, id: i64) -> AppResult<()>;
}

/// Concrete implementation of ParkingSpaceService using Unit of Work.
pub struct ParkingSpaceManager<U: UnitOfWork> {
    uow: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<U: UnitOfWork> ParkingSpaceManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self::with_clock(uow, Arc::new(SystemClock))
    }

    pub fn with_clock(uow: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { uow, clock }
    }
}

fn space_not_found(id: i64) -> String {
    format!("Parking space with id {}", id)
}

#[async_trait]
impl<U: UnitOfWork> ParkingSpaceService for ParkingSpaceManager<U> {
    async fn get_space(&self, id: i64) -> AppResult<ParkingSpace> {
        self.uow
            .parking_spaces()
            .find_by_id(id)
            .await?
            .ok_or_not_found(space_not_found(id))
    }

    async fn get_by_space_number(&self, space_number: &str) -> AppResult<ParkingSpace> {
        self.uow
            .parking_spaces()
            .find_by_space_number(space_number)
            .await?
            .ok_or_not_found(format!("Parking space '{}'", space_number))
    }

    async fn list_spaces(&self) -> AppResult<Vec<ParkingSpace>> {
        self.uow.parking_spaces().list().await
    }

    async fn list_available(&self) -> AppResult<Vec<ParkingSpace>> {
        self.uow
            .parking_spaces()
            .list_by_status(ParkingStatus::Available)
            .await
    }

    async fn list_by_city(&self, city: &str) -> AppResult<Vec<ParkingSpace>> {
        self.uow.parking_spaces().list_by_city(city).await
    }

    async fn list_by_zone(&self, zone: &str) -> AppResult<Vec<ParkingSpace>> {
        self.uow.parking_spaces().list_by_zone(zone).await
    }

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<ParkingSpace>> {
        self.uow.parking_spaces().list_by_owner(owner_id).await
    }

    async fn list_available_in(&self, city: &str, zone: &str) -> AppResult<Vec<ParkingSpace>> {
        self.uow
            .parking_spaces()
            .list_by_city_zone_and_status(city, zone, ParkingStatus::Available)
            .await
    }

    async fn available_count(&self, city: &str) -> AppResult<u64> {
        self.uow
            .parking_spaces()
            .count_by_city_and_status(city, ParkingStatus::Available)
            .await
    }

    async fn create_space(&self, space: NewParkingSpace) -> AppResult<ParkingSpace> {
        let now = self.clock.now();

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    if repo.exists_by_space_number(&space.space_number).await? {
                        warn!(space_number = %space.space_number, "Space number already in use");
                        return Err(AppError::conflict(format!(
                            "Parking space with number '{}'",
                            space.space_number
                        )));
                    }

                    let created = repo.insert(space, now).await?;
                    info!(id = created.id, space_number = %created.space_number, "Parking space created");
                    Ok(created)
                })
            })
            .await
    }

    async fn update_space(&self, id: i64, update: ParkingSpaceUpdate) -> AppResult<ParkingSpace> {
        let now = self.clock.now();

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    let space = repo
                        .find_by_id(id)
                        .await?
                        .ok_or_not_found(space_not_found(id))?;

                    let updated = repo.save(space.apply(update, now)).await?;
                    info!(id, status = %updated.status, "Parking space updated");
                    Ok(updated)
                })
            })
            .await
    }

    async fn reserve(&self, id: i64, duration_hours: i64) -> AppResult<ParkingSpace> {
        let now = self.clock.now();

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    let space = repo
                        .find_by_id(id)
                        .await?
                        .ok_or_not_found(space_not_found(id))?;

                    let reserved = space.reserve(duration_hours, now).map_err(|e| {
                        warn!(id, "Reservation rejected: {}", e);
                        AppError::from(e)
                    })?;

                    let saved = repo.save(reserved).await?;
                    info!(id, duration_hours, "Parking space reserved");
                    Ok(saved)
                })
            })
            .await
    }

    async fn release(&self, id: i64) -> AppResult<ParkingSpace> {
        let now = self.clock.now();

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    let space = repo
                        .find_by_id(id)
                        .await?
                        .ok_or_not_found(space_not_found(id))?;

                    let saved = repo.save(space.release(now)).await?;
                    info!(id, "Parking space released");
                    Ok(saved)
                })
            })
            .await
    }

    async fn occupy(&self, id: i64) -> AppResult<ParkingSpace> {
        let now = self.clock.now();

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    let space = repo
                        .find_by_id(id)
                        .await?
                        .ok_or_not_found(space_not_found(id))?;

                    let occupied = space.occupy(now).map_err(|e| {
                        warn!(id, "Occupy rejected: {}", e);
                        AppError::from(e)
                    })?;

                    let saved = repo.save(occupied).await?;
                    info!(id, "Parking space occupied");
                    Ok(saved)
                })
            })
            .await
    }

    async fn delete_space(&self, id: i64) -> AppResult<()> {
        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    if !repo.delete(id).await? {
                        return Err(AppError::not_found(space_not_found(id)));
                    }
                    info!(id, "Parking space deleted");
                    Ok(())
                })
            })
            .await
    }
}
