//! Ingest hub API server for Omnihub.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Ingest endpoint** (`POST /ingest`) that verifies the HMAC-SHA3
//!   signature on each incoming event envelope before anything else
//!   touches it, appends accepted events to the durable chain, and
//!   rejects tampered envelopes with `403 {"error":"bad sig"}`
//! - **`WebSocket` endpoint** (`/ws/events`) for real-time accepted-event
//!   streaming via [`tokio::sync::broadcast`]
//! - **REST endpoints** for querying recent events, searching indexed
//!   chat/doc text, and inspecting per-source liveness
//! - **Minimal HTML status page** (`GET /`) showing counters and links
//!   to API endpoints
//!
//! # Architecture
//!
//! The hub keeps bounded in-memory projections (event ring, search
//! index, source registry) that are updated on the ingest path, so
//! reads never replay the chain files. Durable history lives in the
//! [`ChainStore`](omni_chain::ChainStore)'s daily JSON-lines segments.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use config::{ConfigError, HubConfig};
pub use error::HubError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::{AcceptedEvent, AppState};
