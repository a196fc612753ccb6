//! Shared type definitions for the Omnihub event notarization system.
//!
//! This crate is the single source of truth for the wire types used across
//! the Omnihub workspace: the signed event envelope accepted by the hub's
//! `/ingest` endpoint, the event kind taxonomy, and the notarized artifact
//! sidecar record.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for server-assigned identifiers
//! - [`envelope`] -- The signed event envelope and its unsigned body
//! - [`kind`] -- Event kind taxonomy
//! - [`notary`] -- Notarized artifact records (file digest sidecars)

pub mod envelope;
pub mod ids;
pub mod kind;
pub mod notary;

// Re-export all public types at crate root for convenience.
pub use envelope::{EVENT_TYPE, SignedEvent};
pub use ids::EventId;
pub use kind::EventKind;
pub use notary::NotarizedArtifact;
