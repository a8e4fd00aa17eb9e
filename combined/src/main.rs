//! Combined binary for development - runs all four services in one process.

use clap::{Parser, Subcommand};
use tracing::{error, info};

use common::{init_tracing, MigrateAction};

#[derive(Parser)]
#[command(name = "parking-platform")]
#[command(about = "Combined parking microservices binary for development")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all services in a single process (development mode)
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, default_value = "8081")]
        parking_space_port: u16,
        #[arg(long, default_value = "8082")]
        payment_port: u16,
        #[arg(long, default_value = "8083")]
        user_port: u16,
        #[arg(long, default_value = "8084")]
        vehicle_port: u16,
    },
    /// Run database migrations for all services
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Serve {
            host,
            parking_space_port,
            payment_port,
            user_port,
            vehicle_port,
        } => {
            info!("Starting combined services in development mode");
            info!("  Parking spaces: http://{}:{}", host, parking_space_port);
            info!("  Payments:       http://{}:{}", host, payment_port);
            info!("  Users:          http://{}:{}", host, user_port);
            info!("  Vehicles:       http://{}:{}", host, vehicle_port);

            let parking_space_host = host.clone();
            let parking_space_handle = tokio::spawn(async move {
                if let Err(e) =
                    parking_space_service_lib::run_embedded(&parking_space_host, parking_space_port)
                        .await
                {
                    error!("Parking space service failed: {}", e);
                }
            });

            let payment_host = host.clone();
            let payment_handle = tokio::spawn(async move {
                if let Err(e) = payment_service_lib::run_embedded(&payment_host, payment_port).await {
                    error!("Payment service failed: {}", e);
                }
            });

            let user_host = host.clone();
            let user_handle = tokio::spawn(async move {
                if let Err(e) = user_service_lib::run_embedded(&user_host, user_port).await {
                    error!("User service failed: {}", e);
                }
            });

            let vehicle_handle = tokio::spawn(async move {
                if let Err(e) = vehicle_service_lib::run_embedded(&host, vehicle_port).await {
                    error!("Vehicle service failed: {}", e);
                }
            });

            // The services are independent; any exit is unexpected
            tokio::select! {
                _ = parking_space_handle => {
                    error!("Parking space service exited unexpectedly");
                }
                _ = payment_handle => {
                    error!("Payment service exited unexpectedly");
                }
                _ = user_handle => {
                    error!("User service exited unexpectedly");
                }
                _ = vehicle_handle => {
                    error!("Vehicle service exited unexpectedly");
                }
            }
        }
        Commands::Migrate { action } => {
            // Each service tracks its own migration table
            parking_space_service_lib::run_migrations(action).await?;
            payment_service_lib::run_migrations(action).await?;
            user_service_lib::run_migrations(action).await?;
            vehicle_service_lib::run_migrations(action).await?;
        }
    }

    Ok(())
}
