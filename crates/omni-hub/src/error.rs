//! Error types for the hub API.
//!
//! [`HubError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. The
//! ingest endpoint's rejection body for signature failures is part of the
//! wire contract: `403 {"error":"bad sig"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the hub API layer.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// The event's signature did not verify.
    #[error("bad sig")]
    BadSignature,

    /// The event's uid is not in the authorized set.
    #[error("unauthorized uid: {0}")]
    UnauthorizedUid(String),

    /// The request body is not a valid event envelope.
    #[error("malformed event: {0}")]
    Malformed(String),

    /// The chain store rejected or failed to persist the event.
    #[error("chain error: {0}")]
    Chain(#[from] omni_chain::ChainError),

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadSignature => (StatusCode::FORBIDDEN, "bad sig".to_owned()),
            Self::UnauthorizedUid(uid) => {
                (StatusCode::FORBIDDEN, format!("unauthorized uid: {uid}"))
            }
            Self::Malformed(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Chain(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("chain: {e}")),
            Self::Serialization(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("JSON error: {e}"))
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
