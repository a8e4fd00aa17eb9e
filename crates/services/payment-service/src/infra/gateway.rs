//! Card gateway.
//!
//! No real processor is wired in. `SimulatedGateway` declines and fails at
//! fixed rates so the FAILED paths of the payment state machine are reachable.

use rand::Rng;

use domain::{
    CardDetails, Payment, CAPTURE_SUCCESS_PERCENT, CARD_DECLINE_ONE_IN, REFUND_SUCCESS_PERCENT,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Card processor seam. Calls are synchronous and local.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait PaymentGateway: Send + Sync {
    /// Issuer check on a well-formed card; `false` is a decline
    fn authorize(&self, card: &CardDetails) -> bool;

    /// Charge the payment's amount; `false` is a processing failure
    fn capture(&self, payment: &Payment) -> bool;

    /// Return a captured amount; `false` leaves the payment untouched
    fn refund(&self, payment: &Payment) -> bool;
}

/// Random outcomes: 1 in 10 cards declined, 95% captures and 98% refunds succeed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedGateway;

impl PaymentGateway for SimulatedGateway {
    fn authorize(&self, _card: &CardDetails) -> bool {
        rand::thread_rng().gen_range(0..CARD_DECLINE_ONE_IN) != 0
    }

    fn capture(&self, _payment: &Payment) -> bool {
        rand::thread_rng().gen_range(0..100) < CAPTURE_SUCCESS_PERCENT
    }

    fn refund(&self, _payment: &Payment) -> bool {
        rand::thread_rng().gen_range(0..100) < REFUND_SUCCESS_PERCENT
    }
}
