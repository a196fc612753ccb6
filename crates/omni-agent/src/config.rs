//! Configuration for the emitter clients.
//!
//! All configuration is loaded from environment variables; the emitters
//! are meant to run unattended on many machines, so there is no config
//! file to ship around.

use crate::error::AgentError;

/// Default hub URL when `HUB_URL` is unset.
const DEFAULT_HUB_URL: &str = "http://127.0.0.1:8080";

/// Default heartbeat interval in seconds.
const DEFAULT_HEARTBEAT_SECS: u64 = 30;

/// Emitter configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Base URL of the ingest hub (e.g. `http://hub.local:8080`).
    pub hub_url: String,
    /// The emitter's signing identity.
    pub uid: String,
    /// Source name carried in every envelope (defaults to the hostname).
    pub source: String,
    /// Project scope for emitted events.
    pub project: String,
    /// Seconds between heartbeats.
    pub heartbeat_secs: u64,
}

impl AgentConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `OMNI_UID` -- the emitter's signing identity
    ///
    /// Optional variables:
    /// - `HUB_URL` -- ingest hub base URL (default `http://127.0.0.1:8080`)
    /// - `OMNI_SOURCE` -- source name (default: hostname, or `unknown`)
    /// - `OMNI_PROJECT` -- project scope (default `general`)
    /// - `OMNI_HEARTBEAT_SECS` -- heartbeat interval (default 30)
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] when `OMNI_UID` is missing or a
    /// numeric variable fails to parse.
    pub fn from_env() -> Result<Self, AgentError> {
        let uid = std::env::var("OMNI_UID")
            .map_err(|e| AgentError::Config(format!("missing required env var OMNI_UID: {e}")))?;

        let hub_url =
            std::env::var("HUB_URL").unwrap_or_else(|_| DEFAULT_HUB_URL.to_owned());

        let source = std::env::var("OMNI_SOURCE").unwrap_or_else(|_| hostname());

        let project = std::env::var("OMNI_PROJECT").unwrap_or_else(|_| "general".to_owned());

        let heartbeat_secs: u64 = std::env::var("OMNI_HEARTBEAT_SECS")
            .unwrap_or_else(|_| DEFAULT_HEARTBEAT_SECS.to_string())
            .parse()
            .map_err(|e| AgentError::Config(format!("invalid OMNI_HEARTBEAT_SECS: {e}")))?;

        Ok(Self {
            hub_url,
            uid,
            source,
            project,
            heartbeat_secs,
        })
    }
}

/// Best-effort hostname lookup from the environment.
pub fn hostname() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "unknown".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_never_empty() {
        assert!(!hostname().is_empty());
    }

    #[test]
    fn heartbeat_default_parses() {
        let parsed: u64 = DEFAULT_HEARTBEAT_SECS.to_string().parse().unwrap_or(0);
        assert_eq!(parsed, 30);
    }
}
