//! Payment service configuration.

use common::ServiceConfig;

pub const SERVICE_NAME: &str = "payment-service";
pub const DEFAULT_PORT: u16 = 8082;

/// Load configuration from `PAYMENT_SERVICE_*` environment variables.
pub fn from_env() -> ServiceConfig {
    ServiceConfig::from_env(SERVICE_NAME, "PAYMENT_SERVICE", DEFAULT_PORT)
}
