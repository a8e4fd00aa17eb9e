//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers::payment_handler::{
    CompletedCountResponse, CreatePaymentRequest, PendingCountResponse, ProcessPaymentRequest,
    TotalRevenueResponse, UserTotalResponse,
};
use crate::handlers::payment_v1_handler::{RegisterPaymentRequest, StatusUpdateRequest};
use domain::{Payment, PaymentMethod, PaymentStatus, Receipt};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::payment_handler::list_payments,
        crate::handlers::payment_handler::get_payment,
        crate::handlers::payment_handler::get_by_transaction_id,
        crate::handlers::payment_handler::list_by_user,
        crate::handlers::payment_handler::list_by_user_and_status,
        crate::handlers::payment_handler::list_user_paid_between,
        crate::handlers::payment_handler::list_by_vehicle,
        crate::handlers::payment_handler::list_by_parking_space,
        crate::handlers::payment_handler::list_by_status,
        crate::handlers::payment_handler::list_by_method,
        crate::handlers::payment_handler::list_paid_between,
        crate::handlers::payment_handler::create_payment,
        crate::handlers::payment_handler::process_payment,
        crate::handlers::payment_handler::refund_payment,
        crate::handlers::payment_handler::cancel_payment,
        crate::handlers::payment_handler::delete_payment,
        crate::handlers::payment_handler::total_revenue,
        crate::handlers::payment_handler::user_total,
        crate::handlers::payment_handler::completed_count,
        crate::handlers::payment_handler::pending_count,
        crate::handlers::payment_v1_handler::register_payment,
        crate::handlers::payment_v1_handler::get_payment,
        crate::handlers::payment_v1_handler::list_by_user,
        crate::handlers::payment_v1_handler::update_status,
        crate::handlers::payment_v1_handler::get_receipt,
    ),
    components(
        schemas(
            Payment,
            PaymentStatus,
            PaymentMethod,
            Receipt,
            CreatePaymentRequest,
            ProcessPaymentRequest,
            RegisterPaymentRequest,
            StatusUpdateRequest,
            TotalRevenueResponse,
            UserTotalResponse,
            CompletedCountResponse,
            PendingCountResponse,
        )
    ),
    tags(
        (name = "Payments", description = "Payment lifecycle, card processing and statistics"),
        (name = "Payments v1", description = "Transaction-id addressed payments and receipts"),
    )
)]
pub struct ApiDoc;
