//! Vehicle Service - HTTP server for vehicles and parking presence.

use vehicle_service_lib::{config, run_embedded, run_migrations};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::run_service(
        config::SERVICE_NAME,
        "Vehicle microservice",
        config::DEFAULT_PORT,
        |host, port| async move { run_embedded(&host, port).await },
        run_migrations,
    )
    .await
}
