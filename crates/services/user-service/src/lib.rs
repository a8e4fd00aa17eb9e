//! User Service Library
//!
//! Driver and owner accounts: registration, password authentication and
//! activation.

pub mod config;
pub mod handlers;
pub mod infra;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use common::{Database, MigrateAction, ServiceConfig};

use crate::infra::{Migrator, Persistence};
use crate::routes::create_router;
use crate::service::UserManager;
use crate::state::AppState;

/// Run the user service as an embedded component (for combined binary).
pub async fn run_embedded(host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::from_env();
    run_server_with_config(host, port, config).await
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::from_env();
    common::run_migrations::<Migrator>(&config.database, action).await
}

async fn run_server_with_config(
    host: &str,
    port: u16,
    config: ServiceConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect::<Migrator>(&config.database).await?;

    let uow = Arc::new(Persistence::new(db.get_connection()));
    let service = Arc::new(UserManager::new(uow));

    let state = AppState::new(service, Some(db));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("{} listening on {}", config.service_name, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
