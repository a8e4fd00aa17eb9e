//! Payment Service - HTTP server for parking payments.

use payment_service_lib::{config, run_embedded, run_migrations};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::run_service(
        config::SERVICE_NAME,
        "Payment microservice",
        config::DEFAULT_PORT,
        |host, port| async move { run_embedded(&host, port).await },
        run_migrations,
    )
    .await
}
