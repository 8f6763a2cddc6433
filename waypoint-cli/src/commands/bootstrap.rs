//! One-shot store bootstrap

use anyhow::{Context, Result};
use clap::Parser;
use waypoint_core::Settings;
use waypoint_server::store::{bootstrap, StoreSession};

/// Arguments for the bootstrap command
#[derive(Parser, Debug)]
pub struct BootstrapArgs {
    /// Store URL (overrides STORE_URL / DATABASE_URL)
    #[arg(long)]
    pub store_url: Option<String>,
}

/// Create collections, indexes and validators; fail if the store is unreachable.
pub async fn run_bootstrap(args: BootstrapArgs) -> Result<()> {
    let mut settings = Settings::from_env().context("Failed to load settings")?;
    if let Some(url) = args.store_url {
        settings.store_url = url;
    }

    let session = StoreSession::open(&settings).context("Failed to open store session")?;
    let result = bootstrap::ensure_all(session.store()).await;
    session.close().await;

    result.with_context(|| format!("Bootstrap of schema '{}' failed", settings.store_db_name))?;
    println!("Bootstrapped schema '{}'", settings.store_db_name);
    Ok(())
}
