//! Error types for the chain store.

use omni_sign::SignError;

/// Errors that can occur in the chain store and notary.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// A filesystem operation failed.
    #[error("chain I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record failed signature verification and was not persisted.
    #[error("record rejected: {0}")]
    Rejected(#[from] SignError),

    /// A record could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A record is missing its `uid` field, so no key can be derived.
    #[error("record has no uid")]
    MissingUid,

    /// The path given for notarization is not a regular file.
    #[error("not a file: {0}")]
    NotAFile(String),
}
