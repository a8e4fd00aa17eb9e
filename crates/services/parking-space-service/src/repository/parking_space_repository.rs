//! Parking space repository.
//!
//! `ParkingSpaceStore` runs against the pool; `TxParkingSpaceRepository`
//! runs inside an open transaction and locks the rows it reads by id.
//! Both delegate to the same query functions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::entities::parking_space::{self, ActiveModel, Entity as ParkingSpaceEntity};
use common::AppResult;
use domain::{NewParkingSpace, ParkingSpace, ParkingStatus};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Parking space repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ParkingSpaceRepository: Send + Sync {
    /// Find by primary key. Inside a transaction the row is locked for update.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<ParkingSpace>>;

    async fn find_by_space_number(&self, space_number: &str) -> AppResult<Option<ParkingSpace>>;

    async fn exists_by_space_number(&self, space_number: &str) -> AppResult<bool>;

    async fn list(&self) -> AppResult<Vec<ParkingSpace>>;

    async fn list_by_status(&self, status: ParkingStatus) -> AppResult<Vec<ParkingSpace>>;

    async fn list_by_city(&self, city: &str) -> AppResult<Vec<ParkingSpace>>;

    async fn list_by_zone(&self, zone: &str) -> AppResult<Vec<ParkingSpace>>;

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<ParkingSpace>>;

    async fn list_by_city_zone_and_status(
        &self,
        city: &str,
        zone: &str,
        status: ParkingStatus,
    ) -> AppResult<Vec<ParkingSpace>>;

    async fn count_by_city_and_status(&self, city: &str, status: ParkingStatus) -> AppResult<u64>;

    /// Insert a new row stamped with `now`
    async fn insert(&self, space: NewParkingSpace, now: DateTime<Utc>) -> AppResult<ParkingSpace>;

    /// Write every column of an existing row
    async fn save(&self, space: ParkingSpace) -> AppResult<ParkingSpace>;

    /// Delete by id; `false` when no row matched
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

/// Concrete implementation of ParkingSpaceRepository over the pool
pub struct ParkingSpaceStore {
    db: DatabaseConnection,
}

impl ParkingSpaceStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Transaction-aware parking space repository.
///
/// Borrows the transaction so it cannot outlive it.
pub struct TxParkingSpaceRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxParkingSpaceRepository<'a> {
    pub fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

// =============================================================================
// Queries
// =============================================================================

async fn find_by_id<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    for_update: bool,
) -> AppResult<Option<ParkingSpace>> {
    let mut query = ParkingSpaceEntity::find_by_id(id);
    if for_update {
        query = query.lock_exclusive();
    }
    Ok(query.one(conn).await?.map(ParkingSpace::from))
}

async fn find_by_space_number<C: ConnectionTrait>(
    conn: &C,
    space_number: &str,
) -> AppResult<Option<ParkingSpace>> {
    let model = ParkingSpaceEntity::find()
        .filter(parking_space::Column::SpaceNumber.eq(space_number))
        .one(conn)
        .await?;
    Ok(model.map(ParkingSpace::from))
}

async fn exists_by_space_number<C: ConnectionTrait>(conn: &C, space_number: &str) -> AppResult<bool> {
    let count = ParkingSpaceEntity::find()
        .filter(parking_space::Column::SpaceNumber.eq(space_number))
        .count(conn)
        .await?;
    Ok(count > 0)
}

async fn list_where<C: ConnectionTrait>(
    conn: &C,
    filter: sea_orm::Condition,
) -> AppResult<Vec<ParkingSpace>> {
    let models = ParkingSpaceEntity::find()
        .filter(filter)
        .order_by_asc(parking_space::Column::Id)
        .all(conn)
        .await?;
    Ok(models.into_iter().map(ParkingSpace::from).collect())
}

async fn count_where<C: ConnectionTrait>(conn: &C, filter: sea_orm::Condition) -> AppResult<u64> {
    Ok(ParkingSpaceEntity::find().filter(filter).count(conn).await?)
}

async fn insert<C: ConnectionTrait>(
    conn: &C,
    space: NewParkingSpace,
    now: DateTime<Utc>,
) -> AppResult<ParkingSpace> {
    let status = space.initial_status();
    let active_model = ActiveModel {
        space_number: Set(space.space_number),
        location: Set(space.location),
        city: Set(space.city),
        zone: Set(space.zone),
        hourly_rate: Set(space.hourly_rate),
        owner_id: Set(space.owner_id),
        status: Set(status.as_str().to_string()),
        reserved_until: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = active_model.insert(conn).await?;
    Ok(ParkingSpace::from(model))
}

async fn save<C: ConnectionTrait>(conn: &C, space: ParkingSpace) -> AppResult<ParkingSpace> {
    let active_model = ActiveModel {
        id: Set(space.id),
        space_number: Set(space.space_number),
        location: Set(space.location),
        city: Set(space.city),
        zone: Set(space.zone),
        hourly_rate: Set(space.hourly_rate),
        owner_id: Set(space.owner_id),
        status: Set(space.status.as_str().to_string()),
        reserved_until: Set(space.reserved_until),
        created_at: Set(space.created_at),
        updated_at: Set(space.updated_at),
    };

    let model = active_model.update(conn).await?;
    Ok(ParkingSpace::from(model))
}

async fn delete<C: ConnectionTrait>(conn: &C, id: i64) -> AppResult<bool> {
    let result = ParkingSpaceEntity::delete_by_id(id).exec(conn).await?;
    Ok(result.rows_affected > 0)
}

fn status_is(status: ParkingStatus) -> sea_orm::Condition {
    sea_orm::Condition::all().add(parking_space::Column::Status.eq(status.as_str()))
}

fn by_city(city: &str) -> sea_orm::Condition {
    sea_orm::Condition::all().add(parking_space::Column::City.eq(city))
}

fn by_zone(zone: &str) -> sea_orm::Condition {
    sea_orm::Condition::all().add(parking_space::Column::Zone.eq(zone))
}

// =============================================================================
// Trait implementations
// =============================================================================

#[async_trait]
impl ParkingSpaceRepository for ParkingSpaceStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<ParkingSpace>> {
        find_by_id(&self.db, id, false).await
    }

    async fn find_by_space_number(&self, space_number: &str) -> AppResult<Option<ParkingSpace>> {
        find_by_space_number(&self.db, space_number).await
    }

    async fn exists_by_space_number(&self, space_number: &str) -> AppResult<bool> {
        exists_by_space_number(&self.db, space_number).await
    }

    async fn list(&self) -> AppResult<Vec<ParkingSpace>> {
        list_where(&self.db, sea_orm::Condition::all()).await
    }

    async fn list_by_status(&self, status: ParkingStatus) -> AppResult<Vec<ParkingSpace>> {
        list_where(&self.db, status_is(status)).await
    }

    async fn list_by_city(&self, city: &str) -> AppResult<Vec<ParkingSpace>> {
        list_where(&self.db, by_city(city)).await
    }

    async fn list_by_zone(&self, zone: &str) -> AppResult<Vec<ParkingSpace>> {
        list_where(&self.db, by_zone(zone)).await
    }

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<ParkingSpace>> {
        let filter = sea_orm::Condition::all().add(parking_space::Column::OwnerId.eq(owner_id));
        list_where(&self.db, filter).await
    }

    async fn list_by_city_zone_and_status(
        &self,
        city: &str,
        zone: &str,
        status: ParkingStatus,
    ) -> AppResult<Vec<ParkingSpace>> {
        let filter = by_city(city).add(by_zone(zone)).add(status_is(status));
        list_where(&self.db, filter).await
    }

    async fn count_by_city_and_status(&self, city: &str, status: ParkingStatus) -> AppResult<u64> {
        count_where(&self.db, by_city(city).add(status_is(status))).await
    }

    async fn insert(&self, space: NewParkingSpace, now: DateTime<Utc>) -> AppResult<ParkingSpace> {
        insert(&self.db, space, now).await
    }

    async fn save(&self, space: ParkingSpace) -> AppResult<ParkingSpace> {
        save(&self.db, space).await
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        delete(&self.db, id).await
    }
}

#[async_trait]
impl<'a> ParkingSpaceRepository for TxParkingSpaceRepository<'a> {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<ParkingSpace>> {
        find_by_id(self.txn, id, true).await
    }

    async fn find_by_space_number(&self, space_number: &str) -> AppResult<Option<ParkingSpace>> {
        find_by_space_number(self.txn, space_number).await
    }

    async fn exists_by_space_number(&self, space_number: &str) -> AppResult<bool> {
        exists_by_space_number(self.txn, space_number).await
    }

    async fn list(&self) -> AppResult<Vec<ParkingSpace>> {
        list_where(self.txn, sea_orm::Condition::all()).await
    }

    async fn list_by_status(&self, status: ParkingStatus) -> AppResult<Vec<ParkingSpace>> {
        list_where(self.txn, status_is(status)).await
    }

    async fn list_by_city(&self, city: &str) -> AppResult<Vec<ParkingSpace>> {
        list_where(self.txn, by_city(city)).await
    }

    async fn list_by_zone(&self, zone: &str) -> AppResult<Vec<ParkingSpace>> {
        list_where(self.txn, by_zone(zone)).await
    }

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<ParkingSpace>> {
        let filter = sea_orm::Condition::all().add(parking_space::Column::OwnerId.eq(owner_id));
        list_where(self.txn, filter).await
    }

    async fn list_by_city_zone_and_status(
        &self,
        city: &str,
        zone: &str,
        status: ParkingStatus,
    ) -> AppResult<Vec<ParkingSpace>> {
        let filter = by_city(city).add(by_zone(zone)).add(status_is(status));
        list_where(self.txn, filter).await
    }

    async fn count_by_city_and_status(&self, city: &str, status: ParkingStatus) -> AppResult<u64> {
        count_where(self.txn, by_city(city).add(status_is(status))).await
    }

    async fn insert(&self, space: NewParkingSpace, now: DateTime<Utc>) -> AppResult<ParkingSpace> {
        insert(self.txn, space, now).await
    }

    async fn save(&self, space: ParkingSpace) -> AppResult<ParkingSpace> {
        save(self.txn, space).await
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        delete(self.txn, id).await
    }
}
