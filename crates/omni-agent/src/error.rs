//! Error types for the emitter clients.

/// Errors that can occur while building or delivering events.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Configuration is missing or invalid.
    #[error("config error: {0}")]
    Config(String),

    /// Signing the envelope failed.
    #[error("signing error: {0}")]
    Sign(#[from] omni_sign::SignError),

    /// The HTTP request could not be completed.
    #[error("delivery error: {0}")]
    Http(#[from] reqwest::Error),

    /// The hub answered with a non-success status.
    #[error("hub rejected event: {status} {body}")]
    Rejected {
        /// HTTP status code returned by the hub.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// Serializing the envelope failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
