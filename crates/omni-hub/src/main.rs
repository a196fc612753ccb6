//! Hub server entry point.
//!
//! Loads configuration (`omnihub.yaml` plus environment overrides),
//! opens the chain store, and serves the ingest API until terminated.

use tracing::info;
use tracing_subscriber::EnvFilter;

use omni_chain::ChainStore;
use omni_hub::config::HubConfig;
use omni_hub::server::start_server;
use omni_hub::state::AppState;

/// Application entry point.
///
/// Initializes logging, loads configuration, opens the chain store,
/// then serves the hub API indefinitely.
///
/// # Errors
///
/// Returns an error if initialization or the server loop fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("omni-hub starting");

    let config = HubConfig::load_default()?;
    info!(
        host = config.server.host,
        port = config.server.port,
        chain_dir = config.chain.dir,
        authorized_uids = config.auth.uids.len(),
        "configuration loaded"
    );

    let chain = ChainStore::open(&config.chain.dir)?;
    info!(dir = %chain.dir().display(), "chain store opened");

    let state = AppState::new(config, chain);

    start_server(state).await?;

    Ok(())
}
