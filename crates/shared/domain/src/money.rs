//! Rules shared by every stored hourly rate.

use rust_decimal::Decimal;

use crate::constants::{MAX_HOURLY_RATE, MONEY_SCALE};
use crate::error::{DomainError, DomainResult};

/// Accept a rate the money columns store exactly.
///
/// # Errors
/// `Validation` for a negative rate, more than two decimal places, or a rate
/// above `MAX_HOURLY_RATE`.
pub fn check_hourly_rate(rate: Decimal) -> DomainResult<()> {
    if rate.is_sign_negative() {
        return Err(DomainError::validation("Hourly rate cannot be negative"));
    }
    if rate.normalize().scale() > MONEY_SCALE {
        return Err(DomainError::validation(format!(
            "Hourly rate cannot have more than {} decimal places",
            MONEY_SCALE
        )));
    }
    if rate > Decimal::from(MAX_HOURLY_RATE) {
        return Err(DomainError::validation(format!(
            "Hourly rate cannot exceed {}",
            MAX_HOURLY_RATE
        )));
    }
    Ok(())
}
