//! Common utilities shared across the parking services.
//!
//! This crate provides:
//! - Unified error handling and per-endpoint status mapping
//! - Configuration, database and clock plumbing
//! - The validated JSON extractor and health check
//! - The `serve`/`migrate` command line every service binary exposes

pub mod cli;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod health;

pub use cli::{init_tracing, run_service, ServiceCli, ServiceCommand};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{DatabaseConfig, ServiceConfig};
pub use db::Database;
pub use error::{respond_with, ApiError, ApiResult, AppError, AppResult, OptionExt};
pub use extract::ValidatedJson;
pub use health::health_report;

/// Migration action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::Subcommand)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset the service's tables and run all migrations
    Fresh,
}

/// Apply `action` with migrator `M` against `config`'s database.
pub async fn run_migrations<M: sea_orm_migration::MigratorTrait>(
    config: &DatabaseConfig,
    action: MigrateAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(config).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations::<M>().await?;
            tracing::info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration::<M>().await?;
            tracing::info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            for (name, applied) in db.migration_status::<M>().await? {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations::<M>().await?;
            tracing::info!("Database reset and migrations applied");
        }
    }

    Ok(())
}
