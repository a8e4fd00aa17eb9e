//! Vehicle service - registration and parking presence.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use common::{AppError, AppResult, Clock, OptionExt, SystemClock};
use domain::{NewVehicle, Vehicle, VehicleType, VehicleUpdate};

use crate::infra::UnitOfWork;

/// Vehicle service trait for dependency injection.
#[async_trait]
pub trait VehicleService: Send + Sync {
    async fn get_vehicle(&self, id: i64) -> AppResult<Vehicle>;

    async fn get_by_license_plate(&self, license_plate: &str) -> AppResult<Vehicle>;

    async fn list_vehicles(&self) -> AppResult<Vec<Vehicle>>;

    async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Vehicle>>;

    async fn list_by_type(&self, vehicle_type: VehicleType) -> AppResult<Vec<Vehicle>>;

    async fn list_by_make(&self, make: &str) -> AppResult<Vec<Vehicle>>;

    async fn list_by_make_and_model(&self, make: &str, model: &str) -> AppResult<Vec<Vehicle>>;

    async fn list_parked(&self) -> AppResult<Vec<Vehicle>>;

    async fn list_parked_by_user(&self, user_id: i64) -> AppResult<Vec<Vehicle>>;

    /// Register an unparked vehicle. The plate must be unused.
    async fn create_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle>;

    /// Replace descriptive fields; a changed plate must be unused
    async fn update_vehicle(&self, id: i64, update: VehicleUpdate) -> AppResult<Vehicle>;

    /// Park in `parking_space_id`. Fails with `InvalidState` when already parked.
    async fn record_entry(&self, id: i64, parking_space_id: i64) -> AppResult<Vehicle>;

    /// Leave the current space. Fails with `InvalidState` when not parked.
    async fn record_exit(&self, id: i64) -> AppResult<Vehicle>;

    /// Remove an unparked vehicle
    async fn delete_vehicle(&self, id: i64) -> AppResult<()>;

    async fn parked_count(&self) -> AppResult<u64>;
}

/// Concrete implementation of VehicleService using Unit of Work.
pub struct VehicleManager<U: UnitOfWork> {
    uow: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<U: UnitOfWork> VehicleManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self::with_clock(uow, Arc::new(SystemClock))
    }

    pub fn with_clock(uow: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { uow, clock }
    }
}

fn vehicle_not_found(id: i64) -> String {
    format!("Vehicle with id {}", id)
}

fn plate_taken(license_plate: &str) -> AppError {
    AppError::conflict(format!("Vehicle with license plate '{}'", license_plate))
}

#[async_trait]
impl<U: UnitOfWork> VehicleService for VehicleManager<U> {
    async fn get_vehicle(&self, id: i64) -> AppResult<Vehicle> {
        self.uow
            .vehicles()
            .find_by_id(id)
            .await?
            .ok_or_not_found(vehicle_not_found(id))
    }

    async fn get_by_license_plate(&self, license_plate: &str) -> AppResult<Vehicle> {
        self.uow
            .vehicles()
            .find_by_license_plate(license_plate)
            .await?
            .ok_or_not_found(format!("Vehicle with license plate '{}'", license_plate))
    }

    async fn list_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        self.uow.vehicles().list().await
    }

    async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Vehicle>> {
        self.uow.vehicles().list_by_user(user_id).await
    }

    async fn list_by_type(&self, vehicle_type: VehicleType) -> AppResult<Vec<Vehicle>> {
        self.uow.vehicles().list_by_type(vehicle_type).await
    }

    async fn list_by_make(&self, make: &str) -> AppResult<Vec<Vehicle>> {
        self.uow.vehicles().list_by_make(make).await
    }

    async fn list_by_make_and_model(&self, make: &str, model: &str) -> AppResult<Vec<Vehicle>> {
        self.uow.vehicles().list_by_make_and_model(make, model).await
    }

    async fn list_parked(&self) -> AppResult<Vec<Vehicle>> {
        self.uow.vehicles().list_parked().await
    }

    async fn list_parked_by_user(&self, user_id: i64) -> AppResult<Vec<Vehicle>> {
        self.uow.vehicles().list_parked_by_user(user_id).await
    }

    async fn create_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        let now = self.clock.now();

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    if repo.exists_by_license_plate(&vehicle.license_plate).await? {
                        warn!(license_plate = %vehicle.license_plate, "License plate already registered");
                        return Err(plate_taken(&vehicle.license_plate));
                    }

                    let created = repo.insert(vehicle, now).await?;
                    info!(id = created.id, license_plate = %created.license_plate, "Vehicle created");
                    Ok(created)
                })
            })
            .await
    }

    async fn update_vehicle(&self, id: i64, update: VehicleUpdate) -> AppResult<Vehicle> {
        let now = self.clock.now();

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    let vehicle = repo
                        .find_by_id(id)
                        .await?
                        .ok_or_not_found(vehicle_not_found(id))?;

                    if update.changes_plate(&vehicle)
                        && repo.exists_by_license_plate(&update.license_plate).await?
                    {
                        warn!(id, license_plate = %update.license_plate, "License plate already registered");
                        return Err(plate_taken(&update.license_plate));
                    }

                    let saved = repo.save(vehicle.apply(update, now)).await?;
                    info!(id, "Vehicle updated");
                    Ok(saved)
                })
            })
            .await
    }

    async fn record_entry(&self, id: i64, parking_space_id: i64) -> AppResult<Vehicle> {
        let now = self.clock.now();

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    let vehicle = repo
                        .find_by_id(id)
                        .await?
                        .ok_or_not_found(vehicle_not_found(id))?;

                    let parked = vehicle.enter(parking_space_id, now).map_err(|e| {
                        warn!(id, parking_space_id, "Entry rejected: vehicle already parked");
                        AppError::from(e)
                    })?;
                    let saved = repo.save(parked).await?;
                    info!(id, parking_space_id, "Vehicle entered");
                    Ok(saved)
                })
            })
            .await
    }

    async fn record_exit(&self, id: i64) -> AppResult<Vehicle> {
        let now = self.clock.now();

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    let vehicle = repo
                        .find_by_id(id)
                        .await?
                        .ok_or_not_found(vehicle_not_found(id))?;

                    let left = vehicle.exit(now)?;
                    let saved = repo.save(left).await?;
                    info!(id, "Vehicle exited");
                    Ok(saved)
                })
            })
            .await
    }

    async fn delete_vehicle(&self, id: i64) -> AppResult<()> {
        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    let vehicle = repo
                        .find_by_id(id)
                        .await?
                        .ok_or_not_found(vehicle_not_found(id))?;

                    if let Err(e) = vehicle.ensure_deletable() {
                        warn!(id, "Delete rejected: vehicle is parked");
                        return Err(e.into());
                    }

                    repo.delete(id).await?;
                    info!(id, "Vehicle deleted");
                    Ok(())
                })
            })
            .await
    }

    async fn parked_count(&self) -> AppResult<u64> {
        self.uow.vehicles().count_parked().await
    }
}
