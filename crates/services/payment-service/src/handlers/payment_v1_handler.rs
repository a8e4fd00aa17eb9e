//! Versioned payment API addressed by transaction id.
//!
//! Errors here keep their natural status: a reused transaction id is 409 and
//! a rejected status edge is 409, while a mismatched transaction id is 400.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use common::{ApiError, ApiResult, AppError, ValidatedJson};
use domain::{Payment, PaymentMethod, PaymentRequest, PaymentStatus, Receipt, StatusChange};

use super::payment_handler::storable_rate;
use crate::state::AppState;

/// Register payment request; the caller owns the transaction id
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPaymentRequest {
    #[validate(length(min = 1, message = "Transaction id is required"))]
    #[schema(example = "TXN-2025-0001")]
    pub transaction_id: String,
    pub user_id: i64,
    pub vehicle_id: i64,
    pub parking_space_id: i64,
    #[validate(custom(function = "storable_rate"))]
    #[schema(example = "2.50")]
    pub hourly_rate: Decimal,
    #[validate(range(min = 1, max = 8760, message = "Parking duration must be 1 to 8760 hours"))]
    #[schema(example = 2)]
    pub parking_duration_hours: i64,
    pub payment_method: PaymentMethod,
}

impl From<RegisterPaymentRequest> for PaymentRequest {
    fn from(req: RegisterPaymentRequest) -> Self {
        Self {
            transaction_id: Some(req.transaction_id),
            user_id: req.user_id,
            vehicle_id: req.vehicle_id,
            parking_space_id: req.parking_space_id,
            hourly_rate: req.hourly_rate,
            parking_duration_hours: req.parking_duration_hours,
            payment_method: req.payment_method,
        }
    }
}

/// Status update request.
///
/// `transactionId`, when present, must match the path.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    #[schema(example = "Issuer unavailable")]
    pub failure_reason: Option<String>,
}

impl From<StatusUpdateRequest> for StatusChange {
    fn from(req: StatusUpdateRequest) -> Self {
        Self {
            status: req.status,
            transaction_id: req.transaction_id,
            failure_reason: req.failure_reason,
        }
    }
}

/// Create v1 payment routes
pub fn payment_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(register_payment))
        .route("/user/:user_id", get(list_by_user))
        .route("/:id", get(get_payment))
        .route("/:id/status", patch(update_status))
        .route("/:id/receipt", get(get_receipt))
}

/// Register a PENDING payment under a new transaction id
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    tag = "Payments v1",
    request_body = RegisterPaymentRequest,
    responses(
        (status = 201, description = "Payment registered", body = Payment),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Transaction id already in use")
    )
)]
pub async fn register_payment(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterPaymentRequest>,
) -> ApiResult<(StatusCode, Json<Payment>)> {
    let payment = state.payments.register_payment(req.into()).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// Get payment by ID
#[utoipa::path(
    get,
    path = "/api/v1/payments/{id}",
    tag = "Payments v1",
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

/// List a user's payments
#[utoipa::path(
    get,
    path = "/api/v1/payments/user/{user_id}",
    tag = "Payments v1",
    params(("user_id" = i64, Path, description = "User ID")),
    responses((status = 200, description = "Payments of the user", body = Vec<Payment>))
)]
pub async fn list_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(state.payments.list_by_user(user_id).await?))
}

/// Move a payment along its state machine
#[utoipa::path(
    patch,
    path = "/api/v1/payments/{transaction_id}/status",
    tag = "Payments v1",
    params(("transaction_id" = String, Path, description = "Transaction ID")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Status updated", body = Payment),
        (status = 400, description = "Transaction id in body does not match"),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Transition not allowed")
    )
)]
pub async fn update_status(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
    ValidatedJson(req): ValidatedJson<StatusUpdateRequest>,
) -> ApiResult<Json<Payment>> {
    let payment = state
        .payments
        .update_status(&transaction_id, req.into())
        .await?;
    Ok(Json(payment))
}

/// Receipt for a COMPLETED payment.
///
/// Failures other than infrastructure errors return an error receipt.
#[utoipa::path(
    get,
    path = "/api/v1/payments/{transaction_id}/receipt",
    tag = "Payments v1",
    params(("transaction_id" = String, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Receipt", body = Receipt),
        (status = 400, description = "Payment is not COMPLETED", body = Receipt),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn get_receipt(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Response {
    match state.payments.generate_receipt(&transaction_id).await {
        Ok(receipt) => Json(receipt).into_response(),
        Err(AppError::InvalidReceipt(msg)) => {
            (StatusCode::BAD_REQUEST, Json(Receipt::error(msg))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
