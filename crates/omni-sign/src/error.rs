//! Error types for signing and verification.

/// Errors that can occur while signing or verifying a record.
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    /// The record did not serialize to a JSON object.
    #[error("record is not a JSON object")]
    NotAnObject,

    /// The record has no `sig` field to verify.
    #[error("record is unsigned")]
    Unsigned,

    /// The `sig` field is not valid lowercase hex of the right length.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// The recomputed MAC does not match the record's signature.
    #[error("signature mismatch")]
    Mismatch,

    /// The record could not be serialized to canonical JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The derived key was rejected by the MAC implementation.
    #[error("invalid MAC key: {0}")]
    InvalidKey(String),
}
