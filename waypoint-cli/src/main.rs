//! waypoint CLI - serve and operate the Waypoint listing API
//!
//! - `serve`: run the HTTP API (PostgreSQL or in-memory store)
//! - `bootstrap`: create collections, indexes and validators
//! - `seal` / `unseal`: field-level encryption with the configured master key

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "waypoint",
    author,
    version,
    about = "Listing API for overseas study and work opportunities",
    long_about = "Serve countries, opportunities, applications, testimonials, partners and blog \
                  posts over HTTP, bootstrap the document store, and seal or unseal field values."
)]
struct Cli {
    /// Debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the telemetry feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Ensure collections, indexes and validators exist, then exit
    Bootstrap(commands::bootstrap::BootstrapArgs),
    /// Encrypt a value into a JSON envelope
    Seal(commands::crypto::SealArgs),
    /// Decrypt a JSON envelope
    Unseal(commands::crypto::UnsealArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })
    .ok();

    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await,
        Commands::Bootstrap(args) => commands::run_bootstrap(args).await,
        Commands::Seal(args) => commands::run_seal(args),
        Commands::Unseal(args) => commands::run_unseal(args),
    };

    tracing_setup::shutdown_otel();
    result
}
