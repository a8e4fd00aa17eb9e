//! Payment repository.
//!
//! `PaymentStore` runs against the pool; `TxPaymentRepository` runs inside an
//! open transaction and locks the row it reads by id or transaction id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::entities::payment::{self, ActiveModel, Entity as PaymentEntity};
use common::AppResult;
use domain::{NewPayment, Payment, PaymentMethod, PaymentStatus};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Payment repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Find by primary key. Inside a transaction the row is locked for update.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Payment>>;

    /// Find by transaction id. Inside a transaction the row is locked for update.
    async fn find_by_transaction_id(&self, transaction_id: &str) -> AppResult<Option<Payment>>;

    async fn exists_by_transaction_id(&self, transaction_id: &str) -> AppResult<bool>;

    async fn list(&self) -> AppResult<Vec<Payment>>;

    async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Payment>>;

    async fn list_by_vehicle(&self, vehicle_id: i64) -> AppResult<Vec<Payment>>;

    async fn list_by_parking_space(&self, parking_space_id: i64) -> AppResult<Vec<Payment>>;

    async fn list_by_status(&self, status: PaymentStatus) -> AppResult<Vec<Payment>>;

    async fn list_by_method(&self, method: PaymentMethod) -> AppResult<Vec<Payment>>;

    async fn list_by_user_and_status(
        &self,
        user_id: i64,
        status: PaymentStatus,
    ) -> AppResult<Vec<Payment>>;

    /// Payments whose payment date falls in `[start, end]`
    async fn list_paid_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Payment>>;

    async fn list_user_paid_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Payment>>;

    /// Sum of amounts in `status`; zero when nothing matches
    async fn sum_amount_by_status(&self, status: PaymentStatus) -> AppResult<Decimal>;

    async fn sum_amount_by_user_and_status(
        &self,
        user_id: i64,
        status: PaymentStatus,
    ) -> AppResult<Decimal>;

    async fn count_by_status(&self, status: PaymentStatus) -> AppResult<u64>;

    /// Insert a new row stamped with `now`
    async fn insert(&self, payment: NewPayment, now: DateTime<Utc>) -> AppResult<Payment>;

    /// Write every column of an existing row
    async fn save(&self, payment: Payment) -> AppResult<Payment>;

    /// Delete by id; `false` when no row matched
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

/// Concrete implementation of PaymentRepository over the pool
pub struct PaymentStore {
    db: DatabaseConnection,
}

impl PaymentStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Transaction-aware payment repository.
pub struct TxPaymentRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxPaymentRepository<'a> {
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
) -> AppResult<Option<Payment>> {
    let mut query = PaymentEntity::find().filter(filter);
    if for_update {
        query = query.lock_exclusive();
    }
    Ok(query.one(conn).await?.map(Payment::from))
}

async fn exists_where<C: ConnectionTrait>(conn: &C, filter: Condition) -> AppResult<bool> {
    Ok(PaymentEntity::find().filter(filter).count(conn).await? > 0)
}

async fn list_where<C: ConnectionTrait>(conn: &C, filter: Condition) -> AppResult<Vec<Payment>> {
    let models = PaymentEntity::find()
        .filter(filter)
        .order_by_asc(payment::Column::Id)
        .all(conn)
        .await?;
    Ok(models.into_iter().map(Payment::from).collect())
}

async fn sum_where<C: ConnectionTrait>(conn: &C, filter: Condition) -> AppResult<Decimal> {
    let total: Option<Option<Decimal>> = PaymentEntity::find()
        .select_only()
        .column_as(payment::Column::Amount.sum(), "total")
        .filter(filter)
        .into_tuple()
        .one(conn)
        .await?;
    Ok(total.flatten().unwrap_or(Decimal::ZERO))
}

async fn count_where<C: ConnectionTrait>(conn: &C, filter: Condition) -> AppResult<u64> {
    Ok(PaymentEntity::find().filter(filter).count(conn).await?)
}

async fn insert<C: ConnectionTrait>(
    conn: &C,
    payment: NewPayment,
    now: DateTime<Utc>,
) -> AppResult<Payment> {
    let active_model = ActiveModel {
        transaction_id: Set(payment.transaction_id),
        user_id: Set(payment.user_id),
        vehicle_id: Set(payment.vehicle_id),
        parking_space_id: Set(payment.parking_space_id),
        amount: Set(payment.amount),
        hourly_rate: Set(payment.hourly_rate),
        parking_duration_hours: Set(payment.parking_duration_hours),
        parking_start_time: Set(payment.parking_start_time),
        parking_end_time: Set(payment.parking_end_time),
        payment_date: Set(None),
        payment_method: Set(payment.payment_method.as_str().to_string()),
        status: Set(payment.status.as_str().to_string()),
        card_number_masked: Set(None),
        failure_reason: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = active_model.insert(conn).await?;
    Ok(Payment::from(model))
}

async fn save<C: ConnectionTrait>(conn: &C, payment: Payment) -> AppResult<Payment> {
    let active_model = ActiveModel {
        id: Set(payment.id),
        transaction_id: Set(payment.transaction_id),
        user_id: Set(payment.user_id),
        vehicle_id: Set(payment.vehicle_id),
        parking_space_id: Set(payment.parking_space_id),
        amount: Set(payment.amount),
        hourly_rate: Set(payment.hourly_rate),
        parking_duration_hours: Set(payment.parking_duration_hours),
        parking_start_time: Set(payment.parking_start_time),
        parking_end_time: Set(payment.parking_end_time),
        payment_date: Set(payment.payment_date),
        payment_method: Set(payment.payment_method.as_str().to_string()),
        status: Set(payment.status.as_str().to_string()),
        card_number_masked: Set(payment.card_number_masked),
        failure_reason: Set(payment.failure_reason),
        created_at: Set(payment.created_at),
        updated_at: Set(payment.updated_at),
    };

    let model = active_model.update(conn).await?;
    Ok(Payment::from(model))
}

async fn delete<C: ConnectionTrait>(conn: &C, id: i64) -> AppResult<bool> {
    let result = PaymentEntity::delete_by_id(id).exec(conn).await?;
    Ok(result.rows_affected > 0)
}

fn by_id(id: i64) -> Condition {
    Condition::all().add(payment::Column::Id.eq(id))
}

fn by_transaction_id(transaction_id: &str) -> Condition {
    Condition::all().add(payment::Column::TransactionId.eq(transaction_id))
}

fn by_user(user_id: i64) -> Condition {
    Condition::all().add(payment::Column::UserId.eq(user_id))
}

fn status_is(status: PaymentStatus) -> Condition {
    Condition::all().add(payment::Column::Status.eq(status.as_str()))
}

fn paid_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Condition {
    Condition::all().add(payment::Column::PaymentDate.between(start, end))
}

// =============================================================================
// Trait implementations
// =============================================================================

#[async_trait]
impl PaymentRepository for PaymentStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Payment>> {
        find_one(&self.db, by_id(id), false).await
    }

    async fn find_by_transaction_id(&self, transaction_id: &str) -> AppResult<Option<Payment>> {
        find_one(&self.db, by_transaction_id(transaction_id), false).await
    }

    async fn exists_by_transaction_id(&self, transaction_id: &str) -> AppResult<bool> {
        exists_where(&self.db, by_transaction_id(transaction_id)).await
    }

    async fn list(&self) -> AppResult<Vec<Payment>> {
        list_where(&self.db, Condition::all()).await
    }

    async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Payment>> {
        list_where(&self.db, by_user(user_id)).await
    }

    async fn list_by_vehicle(&self, vehicle_id: i64) -> AppResult<Vec<Payment>> {
        let filter = Condition::all().add(payment::Column::VehicleId.eq(vehicle_id));
        list_where(&self.db, filter).await
    }

    async fn list_by_parking_space(&self, parking_space_id: i64) -> AppResult<Vec<Payment>> {
        let filter = Condition::all().add(payment::Column::ParkingSpaceId.eq(parking_space_id));
        list_where(&self.db, filter).await
    }

    async fn list_by_status(&self, status: PaymentStatus) -> AppResult<Vec<Payment>> {
        list_where(&self.db, status_is(status)).await
    }

    async fn list_by_method(&self, method: PaymentMethod) -> AppResult<Vec<Payment>> {
        let filter = Condition::all().add(payment::Column::PaymentMethod.eq(method.as_str()));
        list_where(&self.db, filter).await
    }

    async fn list_by_user_and_status(
        &self,
        user_id: i64,
        status: PaymentStatus,
    ) -> AppResult<Vec<Payment>> {
        list_where(&self.db, by_user(user_id).add(status_is(status))).await
    }

    async fn list_paid_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Payment>> {
        list_where(&self.db, paid_between(start, end)).await
    }

    async fn list_user_paid_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Payment>> {
        list_where(&self.db, by_user(user_id).add(paid_between(start, end))).await
    }

    async fn sum_amount_by_status(&self, status: PaymentStatus) -> AppResult<Decimal> {
        sum_where(&self.db, status_is(status)).await
    }

    async fn sum_amount_by_user_and_status(
        &self,
        user_id: i64,
        status: PaymentStatus,
    ) -> AppResult<Decimal> {
        sum_where(&self.db, by_user(user_id).add(status_is(status))).await
    }

    async fn count_by_status(&self, status: PaymentStatus) -> AppResult<u64> {
        count_where(&self.db, status_is(status)).await
    }

    async fn insert(&self, payment: NewPayment, now: DateTime<Utc>) -> AppResult<Payment> {
        insert(&self.db, payment, now).await
    }

    async fn save(&self, payment: Payment) -> AppResult<Payment> {
        save(&self.db, payment).await
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        delete(&self.db, id).await
    }
}

#[async_trait]
impl<'a> PaymentRepository for TxPaymentRepository<'a> {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Payment>> {
        find_one(self.txn, by_id(id), true).await
    }

    async fn find_by_transaction_id(&self, transaction_id: &str) -> AppResult<Option<Payment>> {
        find_one(self.txn, by_transaction_id(transaction_id), true).await
    }

    async fn exists_by_transaction_id(&self, transaction_id: &str) -> AppResult<bool> {
        exists_where(self.txn, by_transaction_id(transaction_id)).await
    }

    async fn list(&self) -> AppResult<Vec<Payment>> {
        list_where(self.txn, Condition::all()).await
    }

    async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Payment>> {
        list_where(self.txn, by_user(user_id)).await
    }

    async fn list_by_vehicle(&self, vehicle_id: i64) -> AppResult<Vec<Payment>> {
        let filter = Condition::all().add(payment::Column::VehicleId.eq(vehicle_id));
        list_where(self.txn, filter).await
    }

    async fn list_by_parking_space(&self, parking_space_id: i64) -> AppResult<Vec<Payment>> {
        let filter = Condition::all().add(payment::Column::ParkingSpaceId.eq(parking_space_id));
        list_where(self.txn, filter).await
    }

    async fn list_by_status(&self, status: PaymentStatus) -> AppResult<Vec<Payment>> {
        list_where(self.txn, status_is(status)).await
    }

    async fn list_by_method(&self, method: PaymentMethod) -> AppResult<Vec<Payment>> {
        let filter = Condition::all().add(payment::Column::PaymentMethod.eq(method.as_str()));
        list_where(self.txn, filter).await
    }

    async fn list_by_user_and_status(
        &self,
        user_id: i64,
        status: PaymentStatus,
    ) -> AppResult<Vec<Payment>> {
        list_where(self.txn, by_user(user_id).add(status_is(status))).await
    }

    async fn list_paid_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Payment>> {
        list_where(self.txn, paid_between(start, end)).await
    }

    async fn list_user_paid_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Payment>> {
        list_where(self.txn, by_user(user_id).add(paid_between(start, end))).await
    }

    async fn sum_amount_by_status(&self, status: PaymentStatus) -> AppResult<Decimal> {
        sum_where(self.txn, status_is(status)).await
    }

    async fn sum_amount_by_user_and_status(
        &self,
        user_id: i64,
        status: PaymentStatus,
    ) -> AppResult<Decimal> {
        sum_where(self.txn, by_user(user_id).add(status_is(status))).await
    }

    async fn count_by_status(&self, status: PaymentStatus) -> AppResult<u64> {
        count_where(self.txn, status_is(status)).await
    }

    async fn insert(&self, payment: NewPayment, now: DateTime<Utc>) -> AppResult<Payment> {
        insert(self.txn, payment, now).await
    }

    async fn save(&self, payment: Payment) -> AppResult<Payment> {
        save(self.txn, payment).await
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        delete(self.txn, id).await
    }
}
