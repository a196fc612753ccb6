//! Canonical JSON serialization and HMAC-SHA3-256 signatures for Omnihub.
//!
//! Every record in the system -- event envelopes on the wire, chain store
//! lines on disk, notarized artifact sidecars -- carries a `sig` field: a
//! lowercase hex HMAC-SHA3-256 computed over the canonical JSON of the
//! record with `sig` removed.
//!
//! # Canonical form
//!
//! Object keys sorted lexicographically at every depth, compact separators
//! (no whitespace), UTF-8 string encoding. Two records with the same data
//! always canonicalize to the same bytes regardless of field order at the
//! call site.
//!
//! # Keys
//!
//! The MAC key is derived from the emitter identity:
//! `key = lowercase_hex(SHA3-256(uid ++ "::QEL"))`, used as its 64 ASCII
//! bytes. The `"::QEL"` domain suffix is part of the wire format; changing
//! it invalidates every existing signature.

pub mod canonical;
pub mod error;
pub mod signer;

pub use canonical::canonical_json;
pub use error::SignError;
pub use signer::{KEY_DOMAIN, Signer, derive_key, verify_event};
