//! Append-only signed chain store and file notarization for Omnihub.
//!
//! The chain is a directory of JSON-lines files, one signed record per
//! line, rotated daily by UTC date. Records are verified before they are
//! written -- nothing unverifiable is ever persisted -- and any file can be
//! replayed later with a verification scan that reports tampered or
//! corrupt lines without aborting.
//!
//! # Modules
//!
//! - [`store`] -- The [`ChainStore`]: append, tail, daily rotation
//! - [`scan`] -- Verification replay of a chain file
//! - [`notary`] -- Signed digest sidecars for arbitrary files
//! - [`error`] -- Unified [`ChainError`]

pub mod error;
pub mod notary;
pub mod scan;
pub mod store;

pub use error::ChainError;
pub use notary::{file_digest, notarize_file};
pub use scan::{ScanFailure, ScanReason, ScanReport, scan_file};
pub use store::ChainStore;
