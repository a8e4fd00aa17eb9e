//! Parking space service configuration.

use common::ServiceConfig;

pub const SERVICE_NAME: &str = "parking-space-service";
pub const DEFAULT_PORT: u16 = 8081;

/// Load configuration from `PARKING_SPACE_SERVICE_*` environment variables.
pub fn from_env() -> ServiceConfig {
    ServiceConfig::from_env(SERVICE_NAME, "PARKING_SPACE_SERVICE", DEFAULT_PORT)
}
