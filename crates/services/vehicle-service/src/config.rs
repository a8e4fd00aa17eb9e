//! Vehicle service configuration.

use common::ServiceConfig;

pub const SERVICE_NAME: &str = "vehicle-service";
pub const DEFAULT_PORT: u16 = 8084;

/// Load configuration from `VEHICLE_SERVICE_*` environment variables.
pub fn from_env() -> ServiceConfig {
    ServiceConfig::from_env(SERVICE_NAME, "VEHICLE_SERVICE", DEFAULT_PORT)
}
