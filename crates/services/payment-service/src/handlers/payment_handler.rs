//! Payment handlers addressed by numeric id.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use common::{respond_with, ApiResult, ValidatedJson};
use domain::{check_hourly_rate, CardDetails, Payment, PaymentMethod, PaymentRequest, PaymentStatus};

use crate::state::AppState;

pub(crate) fn storable_rate(rate: &Decimal) -> Result<(), ValidationError> {
    check_hourly_rate(*rate).map_err(|e| {
        let mut error = ValidationError::new("hourly_rate");
        error.message = Some(e.to_string().into());
        error
    })
}

/// Create payment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    /// Generated when omitted
    #[validate(length(min = 1, message = "Transaction id cannot be empty"))]
    pub transaction_id: Option<String>,
    pub user_id: i64,
    pub vehicle_id: i64,
    pub parking_space_id: i64,
    #[validate(custom(function = "storable_rate"))]
    #[schema(example = "2.50")]
    pub hourly_rate: Decimal,
    #[validate(range(min = 1, max = 8760, message = "Parking duration must be 1 to 8760 hours"))]
    #[schema(example = 3)]
    pub parking_duration_hours: i64,
    pub payment_method: PaymentMethod,
}

impl From<CreatePaymentRequest> for PaymentRequest {
    fn from(req: CreatePaymentRequest) -> Self {
        Self {
            transaction_id: req.transaction_id,
            user_id: req.user_id,
            vehicle_id: req.vehicle_id,
            parking_space_id: req.parking_space_id,
            hourly_rate: req.hourly_rate,
            parking_duration_hours: req.parking_duration_hours,
            payment_method: req.payment_method,
        }
    }
}

/// Card submitted for processing. Every key is required.
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentRequest {
    #[schema(example = "4111111111111111")]
    pub card_number: String,
    #[schema(example = "Jane Doe")]
    pub card_holder_name: String,
    #[schema(example = "12/27")]
    pub expiry_date: String,
    #[schema(example = "123")]
    pub cvv: String,
}

impl From<ProcessPaymentRequest> for CardDetails {
    fn from(req: ProcessPaymentRequest) -> Self {
        Self {
            card_number: req.card_number,
            card_holder_name: req.card_holder_name,
            expiry_date: req.expiry_date,
            cvv: req.cvv,
        }
    }
}

/// Inclusive payment-date window
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DateRangeQuery {
    /// RFC 3339 timestamp
    pub start_date: DateTime<Utc>,
    /// RFC 3339 timestamp
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotalRevenueResponse {
    pub total_revenue: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserTotalResponse {
    pub user_id: i64,
    pub total_paid: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletedCountResponse {
    pub completed_payments: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingCountResponse {
    pub pending_payments: u64,
}

/// Create payment routes
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments).post(create_payment))
        .route("/transaction/:transaction_id", get(get_by_transaction_id))
        .route("/user/:user_id", get(list_by_user))
        .route("/user/:user_id/status/:status", get(list_by_user_and_status))
        .route("/user/:user_id/date-range", get(list_user_paid_between))
        .route("/vehicle/:vehicle_id", get(list_by_vehicle))
        .route("/parking-space/:parking_space_id", get(list_by_parking_space))
        .route("/status/:status", get(list_by_status))
        .route("/method/:method", get(list_by_method))
        .route("/date-range", get(list_paid_between))
        .route("/stats/total-revenue", get(total_revenue))
        .route("/stats/user/:user_id/total", get(user_total))
        .route("/stats/completed-count", get(completed_count))
        .route("/stats/pending-count", get(pending_count))
        .route("/:id", get(get_payment).delete(delete_payment))
        .route("/:id/process", put(process_payment))
        .route("/:id/refund", put(refund_payment))
        .route("/:id/cancel", put(cancel_payment))
}

/// List all payments
#[utoipa::path(
    get,
    path = "/api/payments",
    tag = "Payments",
    responses((status = 200, description = "All payments", body = Vec<Payment>))
)]
pub async fn list_payments(State(state): State<AppState>) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(state.payments.list_payments().await?))
}

/// Get payment by ID
#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    tag = "Payments",
    params(("id" = i64, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment", body = Payment),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Payment>> {
    Ok(Json(state.payments.get_payment(id).await?))
}

/// Get payment by transaction ID
#[utoipa::path(
    get,
    path = "/api/payments/transaction/{transaction_id}",
    tag = "Payments",
    params(("transaction_id" = String, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Payment", body = Payment),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn get_by_transaction_id(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> ApiResult<Json<Payment>> {
    Ok(Json(
        state.payments.get_by_transaction_id(&transaction_id).await?,
    ))
}

/// List a user's payments
#[utoipa::path(
    get,
    path = "/api/payments/user/{user_id}",
    tag = "Payments",
    params(("user_id" = i64, Path, description = "User ID")),
    responses((status = 200, description = "Payments of the user", body = Vec<Payment>))
)]
pub async fn list_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(state.payments.list_by_user(user_id).await?))
}

/// List a user's payments in one status
#[utoipa::path(
    get,
    path = "/api/payments/user/{user_id}/status/{status}",
    tag = "Payments",
    params(
        ("user_id" = i64, Path, description = "User ID"),
        ("status" = PaymentStatus, Path, description = "Payment status")
    ),
    responses((status = 200, description = "Matching payments", body = Vec<Payment>))
)]
pub async fn list_by_user_and_status(
    State(state): State<AppState>,
    Path((user_id, status)): Path<(i64, PaymentStatus)>,
) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(
        state
            .payments
            .list_by_user_and_status(user_id, status)
            .await?,
    ))
}

/// List a user's payments paid within a date window
#[utoipa::path(
    get,
    path = "/api/payments/user/{user_id}/date-range",
    tag = "Payments",
    params(("user_id" = i64, Path, description = "User ID"), DateRangeQuery),
    responses(
        (status = 200, description = "Matching payments", body = Vec<Payment>),
        (status = 400, description = "Start date after end date")
    )
)]
pub async fn list_user_paid_between(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(range): Query<DateRangeQuery>,
) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(
        state
            .payments
            .list_user_paid_between(user_id, range.start_date, range.end_date)
            .await?,
    ))
}

/// List a vehicle's payments
#[utoipa::path(
    get,
    path = "/api/payments/vehicle/{vehicle_id}",
    tag = "Payments",
    params(("vehicle_id" = i64, Path, description = "Vehicle ID")),
    responses((status = 200, description = "Payments for the vehicle", body = Vec<Payment>))
)]
pub async fn list_by_vehicle(
    State(state): State<AppState>,
    Path(vehicle_id): Path<i64>,
) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(state.payments.list_by_vehicle(vehicle_id).await?))
}

/// List a parking space's payments
#[utoipa::path(
    get,
    path = "/api/payments/parking-space/{parking_space_id}",
    tag = "Payments",
    params(("parking_space_id" = i64, Path, description = "Parking space ID")),
    responses((status = 200, description = "Payments for the space", body = Vec<Payment>))
)]
pub async fn list_by_parking_space(
    State(state): State<AppState>,
    Path(parking_space_id): Path<i64>,
) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(
        state.payments.list_by_parking_space(parking_space_id).await?,
    ))
}

/// List payments in one status
#[utoipa::path(
    get,
    path = "/api/payments/status/{status}",
    tag = "Payments",
    params(("status" = PaymentStatus, Path, description = "Payment status")),
    responses((status = 200, description = "Matching payments", body = Vec<Payment>))
)]
pub async fn list_by_status(
    State(state): State<AppState>,
    Path(status): Path<PaymentStatus>,
) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(state.payments.list_by_status(status).await?))
}

/// List payments made with one method
#[utoipa::path(
    get,
    path = "/api/payments/method/{method}",
    tag = "Payments",
    params(("method" = PaymentMethod, Path, description = "Payment method")),
    responses((status = 200, description = "Matching payments", body = Vec<Payment>))
)]
pub async fn list_by_method(
    State(state): State<AppState>,
    Path(method): Path<PaymentMethod>,
) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(state.payments.list_by_method(method).await?))
}

/// List payments paid within a date window
#[utoipa::path(
    get,
    path = "/api/payments/date-range",
    tag = "Payments",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Matching payments", body = Vec<Payment>),
        (status = 400, description = "Start date after end date")
    )
)]
pub async fn list_paid_between(
    State(state): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(
        state
            .payments
            .list_paid_between(range.start_date, range.end_date)
            .await?,
    ))
}

/// Create a PENDING payment
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "Payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment created", body = Payment),
        (status = 400, description = "Invalid input or duplicate transaction id")
    )
)]
pub async fn create_payment(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreatePaymentRequest>,
) -> ApiResult<(StatusCode, Json<Payment>)> {
    let payment = state
        .payments
        .create_payment(req.into())
        .await
        .map_err(respond_with(StatusCode::BAD_REQUEST))?;

    Ok((StatusCode::CREATED, Json(payment)))
}

/// Charge a PENDING payment.
///
/// Declined or malformed cards still return 200 with the payment FAILED.
#[utoipa::path(
    put,
    path = "/api/payments/{id}/process",
    tag = "Payments",
    params(("id" = i64, Path, description = "Payment ID")),
    request_body = ProcessPaymentRequest,
    responses(
        (status = 200, description = "Payment COMPLETED or FAILED", body = Payment),
        (status = 400, description = "Missing card field, unknown payment or payment not PENDING")
    )
)]
pub async fn process_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<ProcessPaymentRequest>,
) -> ApiResult<Json<Payment>> {
    let payment = state
        .payments
        .process_payment(id, req.into())
        .await
        .map_err(respond_with(StatusCode::BAD_REQUEST))?;

    Ok(Json(payment))
}

/// Refund a COMPLETED payment
#[utoipa::path(
    put,
    path = "/api/payments/{id}/refund",
    tag = "Payments",
    params(("id" = i64, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment refunded", body = Payment),
        (status = 400, description = "Unknown payment, not COMPLETED or refund failed")
    )
)]
pub async fn refund_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Payment>> {
    let payment = state
        .payments
        .refund_payment(id)
        .await
        .map_err(respond_with(StatusCode::BAD_REQUEST))?;

    Ok(Json(payment))
}

/// Cancel a PENDING payment
#[utoipa::path(
    put,
    path = "/api/payments/{id}/cancel",
    tag = "Payments",
    params(("id" = i64, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment cancelled", body = Payment),
        (status = 400, description = "Unknown payment or not PENDING")
    )
)]
pub async fn cancel_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Payment>> {
    let payment = state
        .payments
        .cancel_payment(id)
        .await
        .map_err(respond_with(StatusCode::BAD_REQUEST))?;

    Ok(Json(payment))
}

/// Delete a payment that is not COMPLETED
#[utoipa::path(
    delete,
    path = "/api/payments/{id}",
    tag = "Payments",
    params(("id" = i64, Path, description = "Payment ID")),
    responses(
        (status = 204, description = "Payment deleted"),
        (status = 400, description = "Unknown payment or payment COMPLETED")
    )
)]
pub async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .payments
        .delete_payment(id)
        .await
        .map_err(respond_with(StatusCode::BAD_REQUEST))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Sum of COMPLETED payments
#[utoipa::path(
    get,
    path = "/api/payments/stats/total-revenue",
    tag = "Payments",
    responses((status = 200, description = "Total revenue", body = TotalRevenueResponse))
)]
pub async fn total_revenue(State(state): State<AppState>) -> ApiResult<Json<TotalRevenueResponse>> {
    let total_revenue = state.payments.total_revenue().await?;
    Ok(Json(TotalRevenueResponse { total_revenue }))
}

/// Sum of a user's COMPLETED payments
#[utoipa::path(
    get,
    path = "/api/payments/stats/user/{user_id}/total",
    tag = "Payments",
    params(("user_id" = i64, Path, description = "User ID")),
    responses((status = 200, description = "User total", body = UserTotalResponse))
)]
pub async fn user_total(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserTotalResponse>> {
    let total_paid = state.payments.user_total(user_id).await?;
    Ok(Json(UserTotalResponse {
        user_id,
        total_paid,
    }))
}

/// Number of COMPLETED payments
#[utoipa::path(
    get,
    path = "/api/payments/stats/completed-count",
    tag = "Payments",
    responses((status = 200, description = "Completed count", body = CompletedCountResponse))
)]
pub async fn completed_count(
    State(state): State<AppState>,
) -> ApiResult<Json<CompletedCountResponse>> {
    let completed_payments = state
        .payments
        .count_by_status(PaymentStatus::Completed)
        .await?;
    Ok(Json(CompletedCountResponse { completed_payments }))
}

/// Number of PENDING payments
#[utoipa::path(
    get,
    path = "/api/payments/stats/pending-count",
    tag = "Payments",
    responses((status = 200, description = "Pending count", body = PendingCountResponse))
)]
pub async fn pending_count(State(state): State<AppState>) -> ApiResult<Json<PendingCountResponse>> {
    let pending_payments = state
        .payments
        .count_by_status(PaymentStatus::Pending)
        .await?;
    Ok(Json(PendingCountResponse { pending_payments }))
}
