//! Payment service - the payment state machine, card processing and receipts.
//!
//! Two creation paths exist. `create_payment` generates a transaction id when
//! none is given and relies on the unique index alone; `register_payment`
//! requires one and checks it first.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use common::{AppError, AppResult, Clock, OptionExt, SystemClock};
use domain::{
    CardDetails, NewPayment, Payment, PaymentMethod, PaymentRequest, PaymentStatus, Receipt,
    StatusChange,
};

use crate::infra::{PaymentGateway, SimulatedGateway, UnitOfWork};

/// Payment service trait for dependency injection.
#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn get_payment(&self, id: i64) -> AppResult<Payment>;

    async fn get_by_transaction_id(&self, transaction_id: &str) -> AppResult<Payment>;

    async fn list_payments(&self) -> AppResult<Vec<Payment>>;

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

    /// Create a PENDING payment, generating a transaction id if none is given
    async fn create_payment(&self, request: PaymentRequest) -> AppResult<Payment>;

    /// Create a PENDING payment under a caller-chosen, unused transaction id
    async fn register_payment(&self, request: PaymentRequest) -> AppResult<Payment>;

    /// Charge a PENDING payment.
    ///
    /// Rejected cards and failed captures are not errors: the payment is
    /// stored as FAILED and returned.
    async fn process_payment(&self, id: i64, card: CardDetails) -> AppResult<Payment>;

    /// COMPLETED -> REFUNDED; a failed refund leaves the payment COMPLETED
    async fn refund_payment(&self, id: i64) -> AppResult<Payment>;

    /// PENDING -> CANCELLED
    async fn cancel_payment(&self, id: i64) -> AppResult<Payment>;

    /// Delete any payment that is not COMPLETED
    async fn delete_payment(&self, id: i64) -> AppResult<()>;

    /// Direct transition addressed by transaction id
    async fn update_status(&self, transaction_id: &str, change: StatusChange) -> AppResult<Payment>;

    /// Receipt for a COMPLETED payment
    async fn generate_receipt(&self, transaction_id: &str) -> AppResult<Receipt>;

    /// Sum of COMPLETED amounts
    async fn total_revenue(&self) -> AppResult<Decimal>;

    /// Sum of a user's COMPLETED amounts
    async fn user_total(&self, user_id: i64) -> AppResult<Decimal>;

    async fn count_by_status(&self, status: PaymentStatus) -> AppResult<u64>;
}

/// Concrete implementation of PaymentService using Unit of Work.
pub struct PaymentManager<U: UnitOfWork> {
    uow: Arc<U>,
    gateway: Arc<dyn PaymentGateway>,
    clock: Arc<dyn Clock>,
}

impl<U: UnitOfWork> PaymentManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self::with_gateway(uow, Arc::new(SimulatedGateway), Arc::new(SystemClock))
    }

    pub fn with_gateway(
        uow: Arc<U>,
        gateway: Arc<dyn PaymentGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            uow,
            gateway,
            clock,
        }
    }
}

fn payment_not_found(id: i64) -> String {
    format!("Payment with id {}", id)
}

fn transaction_not_found(transaction_id: &str) -> String {
    format!("Payment with transaction id '{}'", transaction_id)
}

#[async_trait]
impl<U: UnitOfWork> PaymentService for PaymentManager<U> {
    async fn get_payment(&self, id: i64) -> AppResult<Payment> {
        self.uow
            .payments()
            .find_by_id(id)
            .await?
            .ok_or_not_found(payment_not_found(id))
    }

    async fn get_by_transaction_id(&self, transaction_id: &str) -> AppResult<Payment> {
        self.uow
            .payments()
            .find_by_transaction_id(transaction_id)
            .await?
            .ok_or_not_found(transaction_not_found(transaction_id))
    }

    async fn list_payments(&self) -> AppResult<Vec<Payment>> {
        self.uow.payments().list().await
    }

    async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Payment>> {
        self.uow.payments().list_by_user(user_id).await
    }

    async fn list_by_vehicle(&self, vehicle_id: i64) -> AppResult<Vec<Payment>> {
        self.uow.payments().list_by_vehicle(vehicle_id).await
    }

    async fn list_by_parking_space(&self, parking_space_id: i64) -> AppResult<Vec<Payment>> {
        self.uow
            .payments()
            .list_by_parking_space(parking_space_id)
            .await
    }

    async fn list_by_status(&self, status: PaymentStatus) -> AppResult<Vec<Payment>> {
        self.uow.payments().list_by_status(status).await
    }

    async fn list_by_method(&self, method: PaymentMethod) -> AppResult<Vec<Payment>> {
        self.uow.payments().list_by_method(method).await
    }

    async fn list_by_user_and_status(
        &self,
        user_id: i64,
        status: PaymentStatus,
    ) -> AppResult<Vec<Payment>> {
        self.uow
            .payments()
            .list_by_user_and_status(user_id, status)
            .await
    }

    async fn list_paid_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Payment>> {
        if start > end {
            return Err(AppError::validation("Start date must not be after end date"));
        }
        self.uow.payments().list_paid_between(start, end).await
    }

    async fn list_user_paid_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Payment>> {
        if start > end {
            return Err(AppError::validation("Start date must not be after end date"));
        }
        self.uow
            .payments()
            .list_user_paid_between(user_id, start, end)
            .await
    }

    async fn create_payment(&self, request: PaymentRequest) -> AppResult<Payment> {
        let now = self.clock.now();
        let new_payment = NewPayment::pending(request, Uuid::new_v4().to_string(), now)?;

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    let created = repo.insert(new_payment, now).await?;
                    info!(
                        id = created.id,
                        transaction_id = %created.transaction_id,
                        amount = %created.amount,
                        "Payment created"
                    );
                    Ok(created)
                })
            })
            .await
    }

    async fn register_payment(&self, request: PaymentRequest) -> AppResult<Payment> {
        let now = self.clock.now();
        let Some(transaction_id) = request.transaction_id.clone() else {
            return Err(AppError::validation("Transaction id is required"));
        };
        let new_payment = NewPayment::pending(request, transaction_id, now)?;

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    if repo
                        .exists_by_transaction_id(&new_payment.transaction_id)
                        .await?
                    {
                        warn!(transaction_id = %new_payment.transaction_id, "Transaction id already in use");
                        return Err(AppError::conflict(format!(
                            "Payment with transaction id '{}'",
                            new_payment.transaction_id
                        )));
                    }

                    let created = repo.insert(new_payment, now).await?;
                    info!(id = created.id, transaction_id = %created.transaction_id, "Payment registered");
                    Ok(created)
                })
            })
            .await
    }

    async fn process_payment(&self, id: i64, card: CardDetails) -> AppResult<Payment> {
        let now = self.clock.now();
        let gateway = self.gateway.clone();

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    let payment = repo
                        .find_by_id(id)
                        .await?
                        .ok_or_not_found(payment_not_found(id))?;
                    payment.ensure_pending()?;

                    let outcome = match card.validate() {
                        Err(e) => payment.fail(e.to_string(), now)?,
                        Ok(()) if !gateway.authorize(&card) => payment.fail("Card declined", now)?,
                        Ok(()) if !gateway.capture(&payment) => {
                            payment.fail("Payment processing failed", now)?
                        }
                        Ok(()) => payment.complete(card.masked_number(), now)?,
                    };

                    let saved = repo.save(outcome).await?;
                    match saved.status {
                        PaymentStatus::Completed => info!(id, "Payment completed"),
                        _ => warn!(
                            id,
                            reason = saved.failure_reason.as_deref().unwrap_or_default(),
                            "Payment failed"
                        ),
                    }
                    Ok(saved)
                })
            })
            .await
    }

    async fn refund_payment(&self, id: i64) -> AppResult<Payment> {
        let now = self.clock.now();
        let gateway = self.gateway.clone();

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    let payment = repo
                        .find_by_id(id)
                        .await?
                        .ok_or_not_found(payment_not_found(id))?;
                    payment.ensure_refundable()?;

                    if !gateway.refund(&payment) {
                        warn!(id, "Refund rejected by gateway");
                        return Err(AppError::payment_failed("Refund processing failed"));
                    }

                    let saved = repo.save(payment.refund(now)?).await?;
                    info!(id, "Payment refunded");
                    Ok(saved)
                })
            })
            .await
    }

    async fn cancel_payment(&self, id: i64) -> AppResult<Payment> {
        let now = self.clock.now();

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    let payment = repo
                        .find_by_id(id)
                        .await?
                        .ok_or_not_found(payment_not_found(id))?;

                    let saved = repo.save(payment.cancel(now)?).await?;
                    info!(id, "Payment cancelled");
                    Ok(saved)
                })
            })
            .await
    }

    async fn delete_payment(&self, id: i64) -> AppResult<()> {
        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    let payment = repo
                        .find_by_id(id)
                        .await?
                        .ok_or_not_found(payment_not_found(id))?;
                    payment.ensure_deletable()?;

                    repo.delete(id).await?;
                    info!(id, "Payment deleted");
                    Ok(())
                })
            })
            .await
    }

    async fn update_status(&self, transaction_id: &str, change: StatusChange) -> AppResult<Payment> {
        let now = self.clock.now();
        let transaction_id = transaction_id.to_string();

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    let payment = repo
                        .find_by_transaction_id(&transaction_id)
                        .await?
                        .ok_or_not_found(transaction_not_found(&transaction_id))?;

                    let from = payment.status;
                    let updated = payment.apply_status(change, now).map_err(|e| {
                        warn!(transaction_id = %transaction_id, "Status change rejected: {}", e);
                        AppError::from(e)
                    })?;

                    let saved = repo.save(updated).await?;
                    info!(transaction_id = %transaction_id, %from, to = %saved.status, "Payment status updated");
                    Ok(saved)
                })
            })
            .await
    }

    async fn generate_receipt(&self, transaction_id: &str) -> AppResult<Receipt> {
        let payment = self.get_by_transaction_id(transaction_id).await?;
        Ok(Receipt::for_payment(&payment, self.clock.now())?)
    }

    async fn total_revenue(&self) -> AppResult<Decimal> {
        self.uow
            .payments()
            .sum_amount_by_status(PaymentStatus::Completed)
            .await
    }

    async fn user_total(&self, user_id: i64) -> AppResult<Decimal> {
        self.uow
            .payments()
            .sum_amount_by_user_and_status(user_id, PaymentStatus::Completed)
            .await
    }

    async fn count_by_status(&self, status: PaymentStatus) -> AppResult<u64> {
        self.uow.payments().count_by_status(status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use common::FixedClock;
    use tokio_test::{assert_err, assert_ok};

    use crate::infra::{MockPaymentGateway, TxFuture};
    use crate::repository::{MockPaymentRepository, PaymentRepository};

    /// Test UnitOfWork that runs transaction bodies straight against the mock
    struct TestUnitOfWork {
        repo: Arc<MockPaymentRepository>,
    }

    #[async_trait]
    impl UnitOfWork for TestUnitOfWork {
        fn payments(&self) -> Arc<dyn PaymentRepository> {
            self.repo.clone()
        }

        async fn transaction<F, T>(&self, f: F) -> AppResult<T>
        where
            F: for<'a> FnOnce(&'a dyn PaymentRepository) -> TxFuture<'a, T> + Send,
            T: Send,
        {
            f(self.repo.as_ref()).await
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn manager(
        repo: MockPaymentRepository,
        gateway: MockPaymentGateway,
    ) -> PaymentManager<TestUnitOfWork> {
        PaymentManager::with_gateway(
            Arc::new(TestUnitOfWork {
                repo: Arc::new(repo),
            }),
            Arc::new(gateway),
            Arc::new(FixedClock::at(now())),
        )
    }

    fn approving_gateway() -> MockPaymentGateway {
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_authorize().return_const(true);
        gateway.expect_capture().return_const(true);
        gateway.expect_refund().return_const(true);
        gateway
    }

    fn payment(id: i64, status: PaymentStatus) -> Payment {
        Payment {
            id,
            transaction_id: "tx-1".to_string(),
            user_id: 1,
            vehicle_id: 2,
            parking_space_id: 3,
            amount: Decimal::new(750, 2),
            hourly_rate: Decimal::new(250, 2),
            parking_duration_hours: 3,
            parking_start_time: now() - Duration::hours(1),
            parking_end_time: now() + Duration::hours(2),
            payment_date: None,
            payment_method: PaymentMethod::CreditCard,
            status,
            card_number_masked: None,
            failure_reason: None,
            created_at: now() - Duration::hours(1),
            updated_at: now() - Duration::hours(1),
        }
    }

    fn request(transaction_id: Option<&str>) -> PaymentRequest {
        PaymentRequest {
            transaction_id: transaction_id.map(str::to_string),
            user_id: 1,
            vehicle_id: 2,
            parking_space_id: 3,
            hourly_rate: Decimal::new(200, 2),
            parking_duration_hours: 3,
            payment_method: PaymentMethod::CreditCard,
        }
    }

    fn card(number: &str) -> CardDetails {
        CardDetails {
            card_number: number.to_string(),
            card_holder_name: "Jane Doe".to_string(),
            expiry_date: "12/30".to_string(),
            cvv: "123".to_string(),
        }
    }

    fn inserted(new: NewPayment, at: DateTime<Utc>) -> Payment {
        Payment {
            id: 1,
            transaction_id: new.transaction_id,
            user_id: new.user_id,
            vehicle_id: new.vehicle_id,
            parking_space_id: new.parking_space_id,
            amount: new.amount,
            hourly_rate: new.hourly_rate,
            parking_duration_hours: new.parking_duration_hours,
            parking_start_time: new.parking_start_time,
            parking_end_time: new.parking_end_time,
            payment_date: None,
            payment_method: new.payment_method,
            status: new.status,
            card_number_masked: None,
            failure_reason: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_create_payment_derives_amount_and_generates_transaction_id() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_exists_by_transaction_id().never();
        repo.expect_insert()
            .returning(|new, at| Ok(inserted(new, at)));

        let created = assert_ok!(
            manager(repo, approving_gateway())
                .create_payment(request(None))
                .await
        );
        assert_eq!(created.amount, Decimal::new(600, 2));
        assert_eq!(created.status, PaymentStatus::Pending);
        assert_eq!(created.parking_end_time, now() + Duration::hours(3));
        assert!(Uuid::parse_str(&created.transaction_id).is_ok());
    }

    #[tokio::test]
    async fn test_create_payment_surfaces_unique_index_conflict() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_insert()
            .times(1)
            .returning(|_, _| Err(AppError::conflict("Record")));

        let err = assert_err!(
            manager(repo, approving_gateway())
                .create_payment(request(Some("tx-1")))
                .await
        );
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_payment_rejects_unstorable_rate_before_insert() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_insert().never();

        let mut sub_cent = request(None);
        sub_cent.hourly_rate = Decimal::new(2005, 3);
        let err = assert_err!(
            manager(repo, approving_gateway())
                .create_payment(sub_cent)
                .await
        );
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_register_payment_rejects_used_transaction_id() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_exists_by_transaction_id().returning(|tx| {
            assert_eq!(tx, "tx-9");
            Ok(true)
        });
        repo.expect_insert().never();

        let err = assert_err!(
            manager(repo, approving_gateway())
                .register_payment(request(Some("tx-9")))
                .await
        );
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_register_payment_requires_transaction_id() {
        let repo = MockPaymentRepository::new();
        let err = assert_err!(
            manager(repo, approving_gateway())
                .register_payment(request(None))
                .await
        );
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_process_completes_and_masks_card() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(payment(id, PaymentStatus::Pending))));
        repo.expect_save().times(1).returning(Ok);

        let processed = assert_ok!(
            manager(repo, approving_gateway())
                .process_payment(1, card("4111111111111111"))
                .await
        );
        assert_eq!(processed.status, PaymentStatus::Completed);
        assert_eq!(processed.payment_date, Some(now()));
        assert_eq!(
            processed.card_number_masked.as_deref(),
            Some("**** **** **** 1111")
        );
    }

    #[tokio::test]
    async fn test_process_malformed_card_stores_failed() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(payment(id, PaymentStatus::Pending))));
        repo.expect_save().times(1).returning(Ok);

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_authorize().never();
        gateway.expect_capture().never();

        let processed = assert_ok!(
            manager(repo, gateway)
                .process_payment(1, card("4111"))
                .await
        );
        assert_eq!(processed.status, PaymentStatus::Failed);
        assert!(processed.card_number_masked.is_none());
        assert!(processed.failure_reason.is_some());
    }

    #[tokio::test]
    async fn test_process_declined_card_stores_failed() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(payment(id, PaymentStatus::Pending))));
        repo.expect_save().returning(Ok);

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_authorize().return_const(false);
        gateway.expect_capture().never();

        let processed = assert_ok!(
            manager(repo, gateway)
                .process_payment(1, card("4111111111111111"))
                .await
        );
        assert_eq!(processed.status, PaymentStatus::Failed);
        assert_eq!(processed.failure_reason.as_deref(), Some("Card declined"));
    }

    #[tokio::test]
    async fn test_process_capture_failure_stores_failed() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(payment(id, PaymentStatus::Pending))));
        repo.expect_save().returning(Ok);

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_authorize().return_const(true);
        gateway.expect_capture().return_const(false);

        let processed = assert_ok!(
            manager(repo, gateway)
                .process_payment(1, card("4111111111111111"))
                .await
        );
        assert_eq!(processed.status, PaymentStatus::Failed);
        assert!(processed.payment_date.is_none());
    }

    #[tokio::test]
    async fn test_process_rejects_non_pending_without_writing() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(payment(id, PaymentStatus::Completed))));
        repo.expect_save().never();

        let err = assert_err!(
            manager(repo, approving_gateway())
                .process_payment(1, card("4111111111111111"))
                .await
        );
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_refund_completed_payment() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(payment(id, PaymentStatus::Completed))));
        repo.expect_save().returning(Ok);

        let refunded = assert_ok!(manager(repo, approving_gateway()).refund_payment(1).await);
        assert_eq!(refunded.status, PaymentStatus::Refunded);
    }

    #[tokio::test]
    async fn test_failed_refund_leaves_payment_unchanged() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(payment(id, PaymentStatus::Completed))));
        repo.expect_save().never();

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_refund().return_const(false);

        let err = assert_err!(manager(repo, gateway).refund_payment(1).await);
        assert!(matches!(err, AppError::PaymentFailed(_)));
    }

    #[tokio::test]
    async fn test_refund_requires_completed() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(payment(id, PaymentStatus::Pending))));

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_refund().never();

        let err = assert_err!(manager(repo, gateway).refund_payment(1).await);
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_cancel_only_pending() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(payment(id, PaymentStatus::Failed))));
        repo.expect_save().never();

        let err = assert_err!(manager(repo, approving_gateway()).cancel_payment(1).await);
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_delete_refuses_completed_payment() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(payment(id, PaymentStatus::Completed))));
        repo.expect_delete().never();

        let err = assert_err!(manager(repo, approving_gateway()).delete_payment(1).await);
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_delete_cancelled_payment() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(payment(id, PaymentStatus::Cancelled))));
        repo.expect_delete().times(1).returning(|_| Ok(true));

        assert_ok!(manager(repo, approving_gateway()).delete_payment(1).await);
    }

    #[tokio::test]
    async fn test_update_status_to_failed_records_reason() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_find_by_transaction_id().returning(|tx| {
            assert_eq!(tx, "tx-1");
            Ok(Some(payment(1, PaymentStatus::Pending)))
        });
        repo.expect_save().returning(Ok);

        let updated = assert_ok!(
            manager(repo, approving_gateway())
                .update_status(
                    "tx-1",
                    StatusChange {
                        status: PaymentStatus::Failed,
                        transaction_id: Some("tx-1".to_string()),
                        failure_reason: Some("Insufficient funds".to_string()),
                    },
                )
                .await
        );
        assert_eq!(updated.status, PaymentStatus::Failed);
        assert_eq!(updated.failure_reason.as_deref(), Some("Insufficient funds"));
    }

    #[tokio::test]
    async fn test_update_status_rejects_illegal_edge() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_find_by_transaction_id()
            .returning(|_| Ok(Some(payment(1, PaymentStatus::Refunded))));
        repo.expect_save().never();

        let err = assert_err!(
            manager(repo, approving_gateway())
                .update_status(
                    "tx-1",
                    StatusChange {
                        status: PaymentStatus::Pending,
                        transaction_id: None,
                        failure_reason: None,
                    },
                )
                .await
        );
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_receipt_requires_completed_payment() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_find_by_transaction_id()
            .returning(|_| Ok(Some(payment(1, PaymentStatus::Pending))));

        let err = assert_err!(
            manager(repo, approving_gateway())
                .generate_receipt("tx-1")
                .await
        );
        assert!(matches!(err, AppError::InvalidReceipt(_)));
    }

    #[tokio::test]
    async fn test_receipt_for_completed_payment() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_find_by_transaction_id().returning(|_| {
            let mut p = payment(1, PaymentStatus::Completed);
            p.payment_date = Some(now());
            Ok(Some(p))
        });

        let receipt = assert_ok!(
            manager(repo, approving_gateway())
                .generate_receipt("tx-1")
                .await
        );
        assert_eq!(receipt.receipt_number.as_deref(), Some("RCPT-tx-1"));
        assert_eq!(receipt.issued_at, Some(now()));
    }

    #[tokio::test]
    async fn test_total_revenue_sums_completed() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_sum_amount_by_status().returning(|status| {
            assert_eq!(status, PaymentStatus::Completed);
            Ok(Decimal::new(12345, 2))
        });

        let total = assert_ok!(manager(repo, approving_gateway()).total_revenue().await);
        assert_eq!(total, Decimal::new(12345, 2));
    }

    #[tokio::test]
    async fn test_date_range_must_be_ordered() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_list_paid_between().never();

        let err = assert_err!(
            manager(repo, approving_gateway())
                .list_paid_between(now(), now() - Duration::days(1))
                .await
        );
        assert!(matches!(err, AppError::Validation(_)));
    }
}
