//! Command line shared by the service binaries.
//!
//! Every service exposes the same `serve` and `migrate` commands; only the
//! binary name, the default port and the two entry points differ.

use std::ffi::OsString;
use std::future::Future;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::MigrateAction;

#[derive(Debug, Parser)]
pub struct ServiceCli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: ServiceCommand,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum ServiceCommand {
    /// Start the HTTP server
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Defaults to the service's configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

impl ServiceCli {
    /// Parse `args` under the given binary name and description.
    pub fn try_parse_for<I, T>(
        name: &'static str,
        about: &'static str,
        args: I,
    ) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut matches = Self::command()
            .name(name)
            .about(about)
            .try_get_matches_from(args)?;
        Self::from_arg_matches_mut(&mut matches)
    }
}

/// Entry point of a service binary.
///
/// Loads `.env`, parses the process arguments, initializes tracing and
/// dispatches to `serve` or `migrate`.
pub async fn run_service<S, SF, M, MF>(
    name: &'static str,
    about: &'static str,
    default_port: u16,
    serve: S,
    migrate: M,
) -> Result<(), Box<dyn std::error::Error>>
where
    S: FnOnce(String, u16) -> SF,
    SF: Future<Output = Result<(), Box<dyn std::error::Error>>>,
    M: FnOnce(MigrateAction) -> MF,
    MF: Future<Output = Result<(), Box<dyn std::error::Error>>>,
{
    dotenvy::dotenv().ok();

    let cli = ServiceCli::try_parse_for(name, about, std::env::args_os())
        .unwrap_or_else(|e| e.exit());
    init_tracing(cli.verbose);

    match cli.command {
        ServiceCommand::Serve { host, port } => serve(host, port.unwrap_or(default_port)).await,
        ServiceCommand::Migrate { action } => migrate(action).await,
    }
}

/// Initialize tracing subscriber; `--verbose` forces debug level
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".to_string())
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ServiceCli, clap::Error> {
        ServiceCli::try_parse_for("vehicle-service", "Vehicle microservice", args)
    }

    #[test]
    fn test_serve_defaults() {
        let cli = parse(&["vehicle-service", "serve"]).unwrap();
        assert!(!cli.verbose);
        assert_eq!(
            cli.command,
            ServiceCommand::Serve {
                host: "0.0.0.0".to_string(),
                port: None
            }
        );
    }

    #[test]
    fn test_serve_with_flags() {
        let cli = parse(&["vehicle-service", "serve", "--host", "127.0.0.1", "--port", "9090", "-v"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(
            cli.command,
            ServiceCommand::Serve {
                host: "127.0.0.1".to_string(),
                port: Some(9090)
            }
        );
    }

    #[test]
    fn test_migrate_actions() {
        for (arg, action) in [
            ("up", MigrateAction::Up),
            ("down", MigrateAction::Down),
            ("status", MigrateAction::Status),
            ("fresh", MigrateAction::Fresh),
        ] {
            let cli = parse(&["vehicle-service", "migrate", arg]).unwrap();
            assert_eq!(cli.command, ServiceCommand::Migrate { action });
        }
    }

    #[test]
    fn test_rejects_unknown_commands() {
        assert!(parse(&["vehicle-service"]).is_err());
        assert!(parse(&["vehicle-service", "migrate", "sideways"]).is_err());
        assert!(parse(&["vehicle-service", "serve", "--port", "70000"]).is_err());
    }

    #[test]
    fn test_help_uses_binary_name() {
        let err = parse(&["vehicle-service", "--help"]).unwrap_err();
        assert!(err.to_string().contains("Vehicle microservice"));
    }
}
