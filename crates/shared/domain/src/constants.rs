//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Parking spaces
// =============================================================================

/// Reservation length used when a request omits `durationHours`
pub const DEFAULT_RESERVATION_HOURS: i64 = 1;

/// Longest reservation or paid parking period, one year
pub const MAX_BOOKING_HOURS: i64 = 8760;

// =============================================================================
// Money
// =============================================================================

/// Decimal places stored for rates and amounts
pub const MONEY_SCALE: u32 = 2;

/// Highest accepted hourly rate, in whole currency units.
///
/// Together with `MAX_BOOKING_HOURS` this keeps every amount inside the
/// `DECIMAL(10, 2)` columns.
pub const MAX_HOURLY_RATE: i64 = 10_000;

// =============================================================================
// Payments
// =============================================================================

/// Shortest accepted card number
pub const MIN_CARD_NUMBER_LENGTH: usize = 13;

/// Longest accepted card number
pub const MAX_CARD_NUMBER_LENGTH: usize = 19;

/// Shortest accepted CVV
pub const MIN_CVV_LENGTH: usize = 3;

/// Longest accepted CVV
pub const MAX_CVV_LENGTH: usize = 4;

/// Masked card prefix; the last four digits are appended
pub const MASKED_CARD_PREFIX: &str = "**** **** **** ";

/// Masked card value when fewer than four digits are known
pub const MASKED_CARD_FALLBACK: &str = "****";

/// Simulated card authorization decline rate, one in N
pub const CARD_DECLINE_ONE_IN: u32 = 10;

/// Simulated capture success rate in percent
pub const CAPTURE_SUCCESS_PERCENT: u32 = 95;

/// Simulated refund success rate in percent
pub const REFUND_SUCCESS_PERCENT: u32 = 98;

/// Receipt number prefix
pub const RECEIPT_PREFIX: &str = "RCPT";

// =============================================================================
// Users
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 6;
