//! cf-tls - enable TLS on managed service instances
//!
//! A companion to the cf CLI that:
//! - Enables TLS on an existing service instance by injecting the
//!   offering-specific arbitrary parameter during a service update
//! - Creates a service instance and enables TLS once provisioning finishes
//! - Lists the offerings it knows how to configure
//!
//! Mutations go through the cf binary; service-key credentials come from
//! the management API with the stored session's endpoint and token.

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cf;
mod client;
mod commands;
mod config;
mod error;
mod output;

use cf::CfProcess;
use cf_tls_types::OfferingRegistry;
use client::ApiClient;
use commands::{create_service, enable_tls, offerings};
use config::{CfSession, CliConfig};

pub use error::{CliError, CliResult};
pub use output::print_error;

/// cf-tls CLI application
#[derive(Parser)]
#[command(name = "cf-tls")]
#[command(about = "Enable TLS on managed service instances", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CF_TLS_CONFIG")]
    config: Option<String>,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table")]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Enable TLS on the specified service instance
    EnableTls {
        /// Service instance name
        #[arg(value_name = "SERVICE_NAME")]
        service_name: String,
    },

    /// Create a service instance, then enable TLS once it is ready
    CreateServiceWithTls {
        /// Service offering to provision from
        #[arg(value_name = "SERVICE")]
        offering: String,

        /// Service plan
        #[arg(value_name = "PLAN")]
        plan: String,

        /// Name for the new service instance
        #[arg(value_name = "SERVICE_INSTANCE")]
        service_instance: String,

        /// Arbitrary parameters for create-service, as JSON
        #[arg(short = 'c', long = "parameters", value_name = "PARAMETERS_AS_JSON")]
        parameters: Option<String>,

        /// Tags for create-service
        #[arg(short = 't', long = "tags", value_name = "TAGS")]
        tags: Option<String>,
    },

    /// List supported service offerings
    Offerings,

    /// Show configuration
    Config,

    /// Check the stored session and management API connectivity
    Status,
}

/// Run using the current process arguments.
pub async fn run() -> CliResult<()> {
    run_with_args(std::env::args_os()).await
}

/// Run using the provided argument iterator.
pub async fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    // Load config and resolve the offering registry
    let config = CliConfig::load(cli.config.as_deref())?;
    let mut registry = OfferingRegistry::builtin();
    registry.extend(config.offerings.clone());

    // Execute command
    match cli.command {
        Commands::EnableTls { service_name } => {
            let (cf, api) = connect(&config)?;
            enable_tls::execute(&service_name, &cf, &api, &registry).await
        }

        Commands::CreateServiceWithTls {
            offering,
            plan,
            service_instance,
            parameters,
            tags,
        } => {
            let (cf, api) = connect(&config)?;
            create_service::execute(
                &offering,
                &plan,
                &service_instance,
                parameters.as_deref(),
                tags.as_deref(),
                &cf,
                &api,
                &registry,
                config.poll_interval(),
            )
            .await
        }

        Commands::Offerings => {
            offerings::execute(&registry, cli.output);
            Ok(())
        }

        Commands::Config => {
            println!("cf binary: {}", config.cf_binary());
            println!("Poll interval: {}ms", config.poll_interval().as_millis());
            println!("Supported offerings: {}", registry.entries().len());
            match CfSession::load() {
                Ok(session) => println!("API target: {}", session.target),
                Err(_) => println!("API target: (not logged in)"),
            }
            Ok(())
        }

        Commands::Status => {
            let session = CfSession::load()?;
            let api = ApiClient::from_session(&session)?;
            match api.ping().await {
                Ok(_) => {
                    println!("✓ management API is reachable");
                    println!("  Target: {}", session.target);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("✗ cannot reach management API at {}: {}", session.target, e);
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Build the two collaborators every mutating command needs
fn connect(config: &CliConfig) -> CliResult<(CfProcess, ApiClient)> {
    let session = CfSession::load()?;
    let api = ApiClient::from_session(&session)?;
    Ok((CfProcess::new(config.cf_binary()), api))
}
