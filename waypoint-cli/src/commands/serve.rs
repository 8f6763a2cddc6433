//! HTTP server command

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use waypoint_core::Settings;
use waypoint_server::store::StoreSession;
use waypoint_server::{run_server, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides BIND_ADDR)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Keep data in memory instead of PostgreSQL (lost on exit)
    #[arg(long)]
    pub memory: bool,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let settings = Settings::from_env().context("Failed to load settings")?;

    let session = if args.memory {
        StoreSession::in_memory()
    } else {
        StoreSession::open(&settings).context("Failed to open store session")?
    };

    let mut config = ServerConfig::from_settings(&settings);
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    config.cors_permissive = args.cors_permissive;

    tracing::info!("Starting waypoint server on {}", config.bind_addr);

    // Run server (blocks until shutdown)
    run_server(session, config).await.context("Server error")?;

    Ok(())
}
