//! Vehicle repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::entities::vehicle::{self, ActiveModel, Entity as VehicleEntity};
use common::AppResult;
use domain::{NewVehicle, Vehicle, VehicleType};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Vehicle repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Find vehicle by ID. Locked for update inside a transaction.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Vehicle>>;

    async fn find_by_license_plate(&self, license_plate: &str) -> AppResult<Option<Vehicle>>;

    async fn exists_by_license_plate(&self, license_plate: &str) -> AppResult<bool>;

    async fn list(&self) -> AppResult<Vec<Vehicle>>;

    async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Vehicle>>;

    async fn list_by_type(&self, vehicle_type: VehicleType) -> AppResult<Vec<Vehicle>>;

    async fn list_by_make(&self, make: &str) -> AppResult<Vec<Vehicle>>;

    async fn list_by_make_and_model(&self, make: &str, model: &str) -> AppResult<Vec<Vehicle>>;

    /// Vehicles with a current parking space
    async fn list_parked(&self) -> AppResult<Vec<Vehicle>>;

    async fn list_parked_by_user(&self, user_id: i64) -> AppResult<Vec<Vehicle>>;

    async fn count_parked(&self) -> AppResult<u64>;

    /// Insert a new, unparked row stamped with `now`
    async fn insert(&self, vehicle: NewVehicle, now: DateTime<Utc>) -> AppResult<Vehicle>;

    /// Write every column of an existing row
    async fn save(&self, vehicle: Vehicle) -> AppResult<Vehicle>;

    /// Delete by id; `false` when no row matched
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

/// Concrete implementation of VehicleRepository over the pool
pub struct VehicleStore {
    db: DatabaseConnection,
}

impl VehicleStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Transaction-aware vehicle repository; id lookups lock the row.
pub struct TxVehicleRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxVehicleRepository<'a> {
    pub fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

// =============================================================================
// Queries
// =============================================================================

async fn find_one<C: ConnectionTrait>(
    conn: &C,
    filter: Condition,
    for_update: bool,
) -> AppResult<Option<Vehicle>> {
    let mut query = VehicleEntity::find().filter(filter);
    if for_update {
        query = query.lock_exclusive();
    }
    Ok(query.one(conn).await?.map(Vehicle::from))
}

async fn list_where<C: ConnectionTrait>(conn: &C, filter: Condition) -> AppResult<Vec<Vehicle>> {
    let models = VehicleEntity::find()
        .filter(filter)
        .order_by_asc(vehicle::Column::Id)
        .all(conn)
        .await?;
    Ok(models.into_iter().map(Vehicle::from).collect())
}

async fn count_where<C: ConnectionTrait>(conn: &C, filter: Condition) -> AppResult<u64> {
    Ok(VehicleEntity::find().filter(filter).count(conn).await?)
}

async fn insert<C: ConnectionTrait>(
    conn: &C,
    vehicle: NewVehicle,
    now: DateTime<Utc>,
) -> AppResult<Vehicle> {
    let active_model = ActiveModel {
        license_plate: Set(vehicle.license_plate),
        user_id: Set(vehicle.user_id),
        make: Set(vehicle.make),
        model: Set(vehicle.model),
        year: Set(vehicle.year),
        color: Set(vehicle.color),
        vehicle_type: Set(vehicle.vehicle_type.as_str().to_string()),
        current_parking_space_id: Set(None),
        entry_time: Set(None),
        exit_time: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = active_model.insert(conn).await?;
    Ok(Vehicle::from(model))
}

async fn save<C: ConnectionTrait>(conn: &C, vehicle: Vehicle) -> AppResult<Vehicle> {
    let active_model = ActiveModel {
        id: Set(vehicle.id),
        license_plate: Set(vehicle.license_plate),
        user_id: Set(vehicle.user_id),
        make: Set(vehicle.make),
        model: Set(vehicle.model),
        year: Set(vehicle.year),
        color: Set(vehicle.color),
        vehicle_type: Set(vehicle.vehicle_type.as_str().to_string()),
        current_parking_space_id: Set(vehicle.current_parking_space_id),
        entry_time: Set(vehicle.entry_time),
        exit_time: Set(vehicle.exit_time),
        created_at: Set(vehicle.created_at),
        updated_at: Set(vehicle.updated_at),
    };

    let model = active_model.update(conn).await?;
    Ok(Vehicle::from(model))
}

async fn delete<C: ConnectionTrait>(conn: &C, id: i64) -> AppResult<bool> {
    let result = VehicleEntity::delete_by_id(id).exec(conn).await?;
    Ok(result.rows_affected > 0)
}

fn by_id(id: i64) -> Condition {
    Condition::all().add(vehicle::Column::Id.eq(id))
}

fn by_plate(license_plate: &str) -> Condition {
    Condition::all().add(vehicle::Column::LicensePlate.eq(license_plate))
}

fn by_user(user_id: i64) -> Condition {
    Condition::all().add(vehicle::Column::UserId.eq(user_id))
}

fn by_make(make: &str) -> Condition {
    Condition::all().add(vehicle::Column::Make.eq(make))
}

fn parked() -> Condition {
    Condition::all().add(vehicle::Column::CurrentParkingSpaceId.is_not_null())
}

// =============================================================================
// Trait implementations
// =============================================================================

#[async_trait]
impl VehicleRepository for VehicleStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Vehicle>> {
        find_one(&self.db, by_id(id), false).await
    }

    async fn find_by_license_plate(&self, license_plate: &str) -> AppResult<Option<Vehicle>> {
        find_one(&self.db, by_plate(license_plate), false).await
    }

    async fn exists_by_license_plate(&self, license_plate: &str) -> AppResult<bool> {
        Ok(count_where(&self.db, by_plate(license_plate)).await? > 0)
    }

    async fn list(&self) -> AppResult<Vec<Vehicle>> {
        list_where(&self.db, Condition::all()).await
    }

    async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Vehicle>> {
        list_where(&self.db, by_user(user_id)).await
    }

    async fn list_by_type(&self, vehicle_type: VehicleType) -> AppResult<Vec<Vehicle>> {
        let filter = Condition::all().add(vehicle::Column::VehicleType.eq(vehicle_type.as_str()));
        list_where(&self.db, filter).await
    }

    async fn list_by_make(&self, make: &str) -> AppResult<Vec<Vehicle>> {
        list_where(&self.db, by_make(make)).await
    }

    async fn list_by_make_and_model(&self, make: &str, model: &str) -> AppResult<Vec<Vehicle>> {
        let filter = by_make(make).add(vehicle::Column::Model.eq(model));
        list_where(&self.db, filter).await
    }

    async fn list_parked(&self) -> AppResult<Vec<Vehicle>> {
        list_where(&self.db, parked()).await
    }

    async fn list_parked_by_user(&self, user_id: i64) -> AppResult<Vec<Vehicle>> {
        list_where(&self.db, parked().add(by_user(user_id))).await
    }

    async fn count_parked(&self) -> AppResult<u64> {
        count_where(&self.db, parked()).await
    }

    async fn insert(&self, vehicle: NewVehicle, now: DateTime<Utc>) -> AppResult<Vehicle> {
        insert(&self.db, vehicle, now).await
    }

    async fn save(&self, vehicle: Vehicle) -> AppResult<Vehicle> {
        save(&self.db, vehicle).await
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        delete(&self.db, id).await
    }
}

#[async_trait]
impl<'a> VehicleRepository for TxVehicleRepository<'a> {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Vehicle>> {
        find_one(self.txn, by_id(id), true).await
    }

    async fn find_by_license_plate(&self, license_plate: &str) -> AppResult<Option<Vehicle>> {
        find_one(self.txn, by_plate(license_plate), false).await
    }

    async fn exists_by_license_plate(&self, license_plate: &str) -> AppResult<bool> {
        Ok(count_where(self.txn, by_plate(license_plate)).await? > 0)
    }

    async fn list(&self) -> AppResult<Vec<Vehicle>> {
        list_where(self.txn, Condition::all()).await
    }

    async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Vehicle>> {
        list_where(self.txn, by_user(user_id)).await
    }

    async fn list_by_type(&self, vehicle_type: VehicleType) -> AppResult<Vec<Vehicle>> {
        let filter = Condition::all().add(vehicle::Column::VehicleType.eq(vehicle_type.as_str()));
        list_where(self.txn, filter).await
    }

    async fn list_by_make(&self, make: &str) -> AppResult<Vec<Vehicle>> {
        list_where(self.txn, by_make(make)).await
    }

    async fn list_by_make_and_model(&self, make: &str, model: &str) -> AppResult<Vec<Vehicle>> {
        let filter = by_make(make).add(vehicle::Column::Model.eq(model));
        list_where(self.txn, filter).await
    }

    async fn list_parked(&self) -> AppResult<Vec<Vehicle>> {
        list_where(self.txn, parked()).await
    }

    async fn list_parked_by_user(&self, user_id: i64) -> AppResult<Vec<Vehicle>> {
        list_where(self.txn, parked().add(by_user(user_id))).await
    }

    async fn count_parked(&self) -> AppResult<u64> {
        count_where(self.txn, parked()).await
    }

    async fn insert(&self, vehicle: NewVehicle, now: DateTime<Utc>) -> AppResult<Vehicle> {
        insert(self.txn, vehicle, now).await
    }

    async fn save(&self, vehicle: Vehicle) -> AppResult<Vehicle> {
        save(self.txn, vehicle).await
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        delete(self.txn, id).await
    }
}
