//! Heartbeat daemon entry point.
//!
//! Emits one signed `heartbeat` event to the hub every
//! `OMNI_HEARTBEAT_SECS` seconds (default 30). The payload carries the
//! hostname, process id, and process uptime so the hub's source registry
//! can answer "is that machine still alive". Delivery failures are
//! logged and the loop continues; a daemon that dies on one failed POST
//! defeats its purpose.

use std::time::Instant;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use omni_agent::config::{AgentConfig, hostname};
use omni_agent::emitter::Emitter;
use omni_types::EventKind;

/// Application entry point.
///
/// Initializes logging, loads configuration from environment variables,
/// then emits heartbeats indefinitely.
///
/// # Errors
///
/// Returns an error only when configuration is invalid; delivery
/// failures never terminate the daemon.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("omni-agent starting");

    let config = AgentConfig::from_env()?;
    info!(
        hub_url = config.hub_url,
        uid = config.uid,
        source = config.source,
        project = config.project,
        heartbeat_secs = config.heartbeat_secs,
        "configuration loaded"
    );

    let emitter = Emitter::new(&config);
    let started = Instant::now();
    let host = hostname();
    let pid = std::process::id();

    let mut ticker =
        tokio::time::interval(std::time::Duration::from_secs(config.heartbeat_secs.max(1)));

    loop {
        ticker.tick().await;

        let payload = serde_json::json!({
            "hostname": host,
            "pid": pid,
            "uptime_secs": started.elapsed().as_secs(),
        });

        match emitter.emit(EventKind::Heartbeat, payload).await {
            Ok(event) => info!(nonce = event.nonce, "heartbeat delivered"),
            Err(e) => warn!(error = %e, "heartbeat delivery failed"),
        }
    }
}
