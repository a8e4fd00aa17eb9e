//! User service configuration.

use common::ServiceConfig;

pub const SERVICE_NAME: &str = "user-service";
pub const DEFAULT_PORT: u16 = 8083;

/// Load configuration from `USER_SERVICE_*` environment variables.
pub fn from_env() -> ServiceConfig {
    ServiceConfig::from_env(SERVICE_NAME, "USER_SERVICE", DEFAULT_PORT)
}
