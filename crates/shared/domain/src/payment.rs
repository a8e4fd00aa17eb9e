//! Payment entity, its status machine, card checks and the receipt projection.

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{
    MASKED_CARD_FALLBACK, MASKED_CARD_PREFIX, MAX_CARD_NUMBER_LENGTH, MAX_CVV_LENGTH,
    MAX_BOOKING_HOURS, MIN_CARD_NUMBER_LENGTH, MIN_CVV_LENGTH, RECEIPT_PREFIX,
};
use crate::error::{DomainError, DomainResult};
use crate::money::check_hourly_rate;

static EXPIRY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}/\d{2}$").expect("expiry pattern is a valid regex"));

/// Payment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
            PaymentStatus::Cancelled => "CANCELLED",
        }
    }

    /// Whether `next` is reachable in one step. Staying put is allowed.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;

        *self == next
            || matches!(
                (self, next),
                (Pending, Completed) | (Pending, Failed) | (Pending, Cancelled) | (Completed, Refunded)
            )
    }
}

impl From<&str> for PaymentStatus {
    fn from(s: &str) -> Self {
        match s {
            "COMPLETED" => PaymentStatus::Completed,
            "FAILED" => PaymentStatus::Failed,
            "REFUNDED" => PaymentStatus::Refunded,
            "CANCELLED" => PaymentStatus::Cancelled,
            _ => PaymentStatus::Pending,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the driver pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    DebitCard,
    DigitalWallet,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "CREDIT_CARD",
            PaymentMethod::DebitCard => "DEBIT_CARD",
            PaymentMethod::DigitalWallet => "DIGITAL_WALLET",
            PaymentMethod::Cash => "CASH",
        }
    }
}

impl From<&str> for PaymentMethod {
    fn from(s: &str) -> Self {
        match s {
            "DEBIT_CARD" => PaymentMethod::DebitCard,
            "DIGITAL_WALLET" => PaymentMethod::DigitalWallet,
            "CASH" => PaymentMethod::Cash,
            _ => PaymentMethod::CreditCard,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub transaction_id: String,
    pub user_id: i64,
    pub vehicle_id: i64,
    pub parking_space_id: i64,
    /// `hourly_rate * parking_duration_hours`, fixed at creation
    pub amount: Decimal,
    pub hourly_rate: Decimal,
    pub parking_duration_hours: i64,
    pub parking_start_time: DateTime<Utc>,
    pub parking_end_time: DateTime<Utc>,
    pub payment_date: Option<DateTime<Utc>>,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    pub card_number_masked: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn is_pending(&self) -> bool {
        self.status == PaymentStatus::Pending
    }

    /// Guard for operations that only apply to PENDING payments
    pub fn ensure_pending(&self) -> DomainResult<()> {
        if self.is_pending() {
            Ok(())
        } else {
            Err(DomainError::invalid_state(format!(
                "Payment is {} and can no longer be processed",
                self.status
            )))
        }
    }

    /// Guard for `refund`
    pub fn ensure_refundable(&self) -> DomainResult<()> {
        if self.status == PaymentStatus::Completed {
            Ok(())
        } else {
            Err(DomainError::invalid_state(
                "Only completed payments can be refunded",
            ))
        }
    }

    /// COMPLETED payments represent a settled charge and are never deleted
    pub fn ensure_deletable(&self) -> DomainResult<()> {
        if self.status == PaymentStatus::Completed {
            Err(DomainError::invalid_state("Cannot delete a completed payment"))
        } else {
            Ok(())
        }
    }

    /// PENDING -> COMPLETED with the card already masked
    pub fn complete(self, card_number_masked: String, now: DateTime<Utc>) -> DomainResult<Self> {
        self.ensure_pending()?;
        Ok(Self {
            status: PaymentStatus::Completed,
            payment_date: Some(now),
            card_number_masked: Some(card_number_masked),
            failure_reason: None,
            updated_at: now,
            ..self
        })
    }

    /// PENDING -> FAILED
    pub fn fail(self, reason: impl Into<String>, now: DateTime<Utc>) -> DomainResult<Self> {
        self.ensure_pending()?;
        Ok(Self {
            status: PaymentStatus::Failed,
            failure_reason: Some(reason.into()),
            updated_at: now,
            ..self
        })
    }

    /// COMPLETED -> REFUNDED
    pub fn refund(self, now: DateTime<Utc>) -> DomainResult<Self> {
        self.ensure_refundable()?;
        Ok(Self {
            status: PaymentStatus::Refunded,
            updated_at: now,
            ..self
        })
    }

    /// PENDING -> CANCELLED
    pub fn cancel(self, now: DateTime<Utc>) -> DomainResult<Self> {
        if !self.is_pending() {
            return Err(DomainError::invalid_state(
                "Only pending payments can be cancelled",
            ));
        }
        Ok(Self {
            status: PaymentStatus::Cancelled,
            updated_at: now,
            ..self
        })
    }

    /// Direct status transition addressed by transaction id.
    ///
    /// # Errors
    /// `Validation` when the change names a different transaction, and
    /// `InvalidState` when `change.status` is not reachable from the current one.
    pub fn apply_status(self, change: StatusChange, now: DateTime<Utc>) -> DomainResult<Self> {
        if let Some(ref tx) = change.transaction_id {
            if *tx != self.transaction_id {
                return Err(DomainError::validation(
                    "Transaction id in body does not match the payment",
                ));
            }
        }
        if !self.status.can_transition_to(change.status) {
            return Err(DomainError::invalid_state(format!(
                "Cannot move payment from {} to {}",
                self.status, change.status
            )));
        }

        let failure_reason = match change.status {
            PaymentStatus::Failed => change.failure_reason.or(self.failure_reason),
            _ => self.failure_reason,
        };
        let payment_date = match change.status {
            PaymentStatus::Completed => self.payment_date.or(Some(now)),
            _ => self.payment_date,
        };

        Ok(Self {
            status: change.status,
            failure_reason,
            payment_date,
            updated_at: now,
            ..self
        })
    }
}

/// Caller-supplied fields for a new payment
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub transaction_id: Option<String>,
    pub user_id: i64,
    pub vehicle_id: i64,
    pub parking_space_id: i64,
    pub hourly_rate: Decimal,
    pub parking_duration_hours: i64,
    pub payment_method: PaymentMethod,
}

/// A PENDING payment ready to insert, with amount and parking window derived
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub transaction_id: String,
    pub user_id: i64,
    pub vehicle_id: i64,
    pub parking_space_id: i64,
    pub amount: Decimal,
    pub hourly_rate: Decimal,
    pub parking_duration_hours: i64,
    pub parking_start_time: DateTime<Utc>,
    pub parking_end_time: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
}

impl NewPayment {
    /// Build a PENDING payment starting at `now`.
    ///
    /// `transaction_id` is used when the request does not carry one.
    pub fn pending(
        request: PaymentRequest,
        transaction_id: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let hours = request.parking_duration_hours;
        if hours <= 0 {
            return Err(DomainError::validation(
                "Parking duration must be a positive number of hours",
            ));
        }
        if hours > MAX_BOOKING_HOURS {
            return Err(DomainError::validation(format!(
                "Parking duration cannot exceed {} hours",
                MAX_BOOKING_HOURS
            )));
        }
        check_hourly_rate(request.hourly_rate)?;

        let amount = request
            .hourly_rate
            .checked_mul(Decimal::from(hours))
            .ok_or_else(|| DomainError::validation("Payment amount is out of range"))?;
        let parking_end_time = Duration::try_hours(hours)
            .and_then(|span| now.checked_add_signed(span))
            .ok_or_else(|| DomainError::validation("Parking end time is out of range"))?;

        Ok(Self {
            transaction_id: request.transaction_id.unwrap_or(transaction_id),
            user_id: request.user_id,
            vehicle_id: request.vehicle_id,
            parking_space_id: request.parking_space_id,
            amount,
            hourly_rate: request.hourly_rate,
            parking_duration_hours: request.parking_duration_hours,
            parking_start_time: now,
            parking_end_time,
            payment_method: request.payment_method,
            status: PaymentStatus::Pending,
        })
    }
}

/// Direct status change requested by transaction id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub failure_reason: Option<String>,
}

/// Card fields submitted to `process`
#[derive(Clone, PartialEq, Eq)]
pub struct CardDetails {
    pub card_number: String,
    pub card_holder_name: String,
    pub expiry_date: String,
    pub cvv: String,
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("card_number", &self.masked_number())
            .field("card_holder_name", &self.card_holder_name)
            .field("expiry_date", &"[REDACTED]")
            .field("cvv", &"[REDACTED]")
            .finish()
    }
}

impl CardDetails {
    /// Format checks on the submitted card.
    ///
    /// # Errors
    /// `Validation` naming the first field that fails.
    pub fn validate(&self) -> DomainResult<()> {
        let number_len = self.card_number.chars().count();
        if !(MIN_CARD_NUMBER_LENGTH..=MAX_CARD_NUMBER_LENGTH).contains(&number_len) {
            return Err(DomainError::validation(format!(
                "Card number must be {}-{} characters",
                MIN_CARD_NUMBER_LENGTH, MAX_CARD_NUMBER_LENGTH
            )));
        }
        if self.card_holder_name.trim().is_empty() {
            return Err(DomainError::validation("Card holder name is required"));
        }
        if !EXPIRY_PATTERN.is_match(&self.expiry_date) {
            return Err(DomainError::validation("Expiry date must be MM/YY"));
        }
        let cvv_len = self.cvv.chars().count();
        if !(MIN_CVV_LENGTH..=MAX_CVV_LENGTH).contains(&cvv_len) {
            return Err(DomainError::validation(format!(
                "CVV must be {}-{} characters",
                MIN_CVV_LENGTH, MAX_CVV_LENGTH
            )));
        }
        Ok(())
    }

    /// `**** **** **** 1234`, or `****` when fewer than four digits are known
    pub fn masked_number(&self) -> String {
        let chars: Vec<char> = self.card_number.chars().collect();
        if chars.len() < 4 {
            return MASKED_CARD_FALLBACK.to_string();
        }
        let last_four: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", MASKED_CARD_PREFIX, last_four)
    }
}

/// Read-only receipt derived from a COMPLETED payment.
///
/// An error receipt carries only `receipt_note`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub receipt_number: Option<String>,
    pub transaction_id: Option<String>,
    pub payment_id: Option<i64>,
    pub user_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub parking_space_id: Option<i64>,
    pub amount: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
    pub parking_duration_hours: Option<i64>,
    pub parking_start_time: Option<DateTime<Utc>>,
    pub parking_end_time: Option<DateTime<Utc>>,
    pub payment_date: Option<DateTime<Utc>>,
    pub payment_method: Option<PaymentMethod>,
    pub card_number_masked: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub receipt_note: Option<String>,
}

impl Receipt {
    /// Project a receipt from `payment`.
    ///
    /// # Errors
    /// `InvalidReceipt` unless the payment is COMPLETED.
    pub fn for_payment(payment: &Payment, issued_at: DateTime<Utc>) -> DomainResult<Self> {
        if payment.status != PaymentStatus::Completed {
            return Err(DomainError::invalid_receipt(format!(
                "Receipt is only available for completed payments, payment is {}",
                payment.status
            )));
        }

        Ok(Self {
            receipt_number: Some(format!("{}-{}", RECEIPT_PREFIX, payment.transaction_id)),
            transaction_id: Some(payment.transaction_id.clone()),
            payment_id: Some(payment.id),
            user_id: Some(payment.user_id),
            vehicle_id: Some(payment.vehicle_id),
            parking_space_id: Some(payment.parking_space_id),
            amount: Some(payment.amount),
            hourly_rate: Some(payment.hourly_rate),
            parking_duration_hours: Some(payment.parking_duration_hours),
            parking_start_time: Some(payment.parking_start_time),
            parking_end_time: Some(payment.parking_end_time),
            payment_date: payment.payment_date,
            payment_method: Some(payment.payment_method),
            card_number_masked: payment.card_number_masked.clone(),
            issued_at: Some(issued_at),
            receipt_note: Some("Thank you for parking with us".to_string()),
        })
    }

    /// Receipt body returned alongside a 400
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            receipt_note: Some(format!("Error: {}", message)),
            ..Self::default()
        }
    }
}
