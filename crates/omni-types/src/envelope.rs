//! The signed event envelope.
//!
//! Every event in the system travels as one JSON object:
//!
//! ```json
//! { "type": "omni.event", "uid": "...", "kind": "...", "source": "...",
//!   "project": "...", "ts": 1700000000, "nonce": 12345, "payload": {...},
//!   "sig": "<hex HMAC-SHA3-256>" }
//! ```
//!
//! The signature covers the canonical JSON of every field except `sig`.
//! Signing and verification live in `omni-sign`; this crate only defines
//! the shape.

use serde::{Deserialize, Serialize};

use crate::kind::EventKind;

/// The fixed `type` discriminator carried by every event envelope.
pub const EVENT_TYPE: &str = "omni.event";

/// A signed (or not-yet-signed) event envelope.
///
/// `sig` is `None` while the envelope is being constructed and `Some` once
/// it has been signed. Serialization omits the field entirely when absent,
/// so the canonical JSON of an unsigned envelope is exactly the byte
/// sequence the signature is computed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEvent {
    /// Envelope discriminator, always [`EVENT_TYPE`].
    #[serde(rename = "type", default = "default_event_type")]
    pub event_type: String,

    /// Identity of the emitter. The signing key is derived from this value.
    pub uid: String,

    /// Event kind; drives hub-side dispatch.
    pub kind: EventKind,

    /// Name of the emitting device or process (e.g. a hostname).
    pub source: String,

    /// Project the event belongs to (search is scoped per project).
    pub project: String,

    /// Unix timestamp in seconds at emission time.
    pub ts: i64,

    /// Per-event nonce distinguishing otherwise-identical envelopes.
    pub nonce: u32,

    /// Arbitrary JSON payload.
    pub payload: serde_json::Value,

    /// Lowercase hex HMAC-SHA3-256 over the canonical JSON of all other
    /// fields. Absent until the envelope is signed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
}

impl SignedEvent {
    /// Build an unsigned envelope with the current wire `type` tag.
    pub fn unsigned(
        uid: impl Into<String>,
        kind: EventKind,
        source: impl Into<String>,
        project: impl Into<String>,
        ts: i64,
        nonce: u32,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_type: EVENT_TYPE.to_owned(),
            uid: uid.into(),
            kind,
            source: source.into(),
            project: project.into(),
            ts,
            nonce,
            payload,
            sig: None,
        }
    }

    /// Whether the envelope carries a signature.
    pub const fn is_signed(&self) -> bool {
        self.sig.is_some()
    }

    /// Searchable text carried in the payload, if any.
    ///
    /// Only `chat` and `doc` events are indexed, and only when the payload
    /// has a non-blank string under the `text` key.
    pub fn indexable_text(&self) -> Option<&str> {
        if !self.kind.is_indexable() {
            return None;
        }
        self.payload
            .get("text")
            .and_then(serde_json::Value::as_str)
            .filter(|t| !t.trim().is_empty())
    }
}

fn default_event_type() -> String {
    EVENT_TYPE.to_owned()
}
