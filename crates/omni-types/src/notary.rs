//! Notarized artifact records.
//!
//! Notarization stamps a file with a signed digest record written to a
//! `.notarized.json` sidecar next to the original. The record proves the
//! file's content (by SHA3-256 digest) was seen by the named identity at
//! the recorded time.

use serde::{Deserialize, Serialize};

/// A signed digest record for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotarizedArtifact {
    /// Identity that notarized the artifact.
    pub uid: String,

    /// Unix timestamp in seconds at notarization time.
    pub ts: i64,

    /// Basename of the notarized file.
    pub artifact: String,

    /// Lowercase hex SHA3-256 digest of the file's bytes.
    pub hash: String,

    /// Label of the chain this record belongs to.
    pub chain: String,

    /// Lowercase hex HMAC-SHA3-256 over the canonical JSON of all other
    /// fields. Absent until the record is signed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
}
