//! Folio - paper-trading service entry point
//!
//! Loads configuration, initializes tracing, and serves the REST API until
//! interrupted.

use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use folio_api::{config::ApiConfig, ApiServer};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Serve fixed sandbox quotes instead of calling the quote vendor
    #[arg(long)]
    sandbox: bool,

    /// Log filter (overrides the configured one, e.g. "folio=debug")
    #[arg(long)]
    log_filter: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // The sandbox flag must be visible to config loading, which validates
    // that a quote token exists for non-sandbox runs.
    if args.sandbox {
        std::env::set_var("FOLIO_SANDBOX", "true");
    }

    let config =
        ApiConfig::from_env().map_err(|e| anyhow::anyhow!("configuration error: {e}"))?;

    let filter = args
        .log_filter
        .clone()
        .unwrap_or_else(|| config.log_filter.clone());
    init_tracing(&filter);

    info!("Starting folio v{}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.environment);

    let server = ApiServer::new(config).await?;

    tokio::select! {
        result = server.serve() => {
            if let Err(e) = result {
                error!("API server error: {e}");
                return Err(e.into());
            }
        }
        _ = signal::ctrl_c() => {
            info!("Received shutdown signal, exiting");
        }
    }

    Ok(())
}

fn init_tracing(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
