//! Emitter clients for Omnihub.
//!
//! This crate provides the client side of the signed-event pipeline:
//!
//! - [`Emitter`] builds, signs, and delivers event envelopes to a hub's
//!   `/ingest` endpoint with bounded retry
//! - the `omni-agent` binary runs a periodic heartbeat daemon
//! - the `omni-notary` binary notarizes files into signed sidecar
//!   records via [`omni_chain`]
//!
//! Configuration is environment-driven (see [`AgentConfig::from_env`])
//! so emitters can run unattended on many machines.

pub mod config;
pub mod emitter;
pub mod error;

pub use config::AgentConfig;
pub use emitter::Emitter;
pub use error::AgentError;
