//! Configuration loading and typed config structures for the hub.
//!
//! The canonical configuration lives in `omnihub.yaml` next to the
//! binary's working directory. This module defines strongly-typed structs
//! that mirror the YAML structure, and provides a loader that reads the
//! file and applies environment overrides.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level hub configuration.
///
/// Mirrors the structure of `omnihub.yaml`. All fields have defaults so
/// the hub runs with no config file at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HubConfig {
    /// Network settings (bind address, port).
    #[serde(default)]
    pub server: ServerSection,

    /// Chain store settings.
    #[serde(default)]
    pub chain: ChainSection,

    /// Identity authorization settings.
    #[serde(default)]
    pub auth: AuthSection,
}

impl HubConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `OMNI_HUB_ADDR` overrides `server.host`
    /// - `OMNI_HUB_PORT` overrides `server.port`
    /// - `OMNI_CHAIN_DIR` overrides `chain.dir`
    /// - `OMNI_AUTHORIZED_UIDS` (comma-separated) overrides `auth.uids`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from `omnihub.yaml` when present, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] only when a config file exists but cannot
    /// be read or parsed.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Path::new("omnihub.yaml");
        if path.exists() {
            Self::from_file(path)
        } else {
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Override config values with environment variables when set.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("OMNI_HUB_ADDR") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("OMNI_HUB_PORT")
            && let Ok(port) = val.parse::<u16>()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("OMNI_CHAIN_DIR") {
            self.chain.dir = val;
        }
        if let Ok(val) = std::env::var("OMNI_AUTHORIZED_UIDS") {
            self.auth.uids = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
                .collect();
        }
    }

    /// Whether events from this uid are accepted.
    ///
    /// An empty authorized set accepts any uid whose signature verifies
    /// (development mode); a non-empty set is an allow-list.
    pub fn is_authorized(&self, uid: &str) -> bool {
        self.auth.uids.is_empty() || self.auth.uids.iter().any(|u| u == uid)
    }
}

/// Network settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// The host address to bind to (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Chain store settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChainSection {
    /// Directory holding the JSON-lines chain segments.
    #[serde(default = "default_chain_dir")]
    pub dir: String,
}

impl Default for ChainSection {
    fn default() -> Self {
        Self {
            dir: default_chain_dir(),
        }
    }
}

/// Identity authorization settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthSection {
    /// Allow-listed emitter uids. Empty accepts any verifying uid.
    #[serde(default)]
    pub uids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

fn default_chain_dir() -> String {
    "./chain".to_owned()
}
