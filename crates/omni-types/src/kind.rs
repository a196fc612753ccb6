//! Event kind taxonomy.
//!
//! The hub routes accepted events by kind: heartbeats feed the source
//! registry, chats and docs feed the search index, everything else is
//! chained and broadcast without further handling.

use serde::{Deserialize, Serialize};

/// The kind of a signed event.
///
/// Serialized as a snake_case string on the wire (`"heartbeat"`, `"chat"`,
/// ...). Unknown kinds deserialize to [`EventKind::Other`] rather than
/// failing the parse: the ingest boundary accepts any kind and only the
/// dispatch step cares which ones it recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Periodic liveness report from an emitter agent.
    Heartbeat,
    /// A chat message; payload text is indexed for search.
    Chat,
    /// A document; payload text is indexed for search.
    Doc,
    /// An automated pipeline step (e.g. a notarized build artifact).
    Automation,
    /// An alert raised by an agent.
    Alert,
    /// A command issued to an agent.
    Command,
    /// Any kind the hub does not recognize.
    #[serde(other)]
    Other,
}

impl EventKind {
    /// Whether events of this kind carry searchable text in their payload.
    pub const fn is_indexable(self) -> bool {
        matches!(self, Self::Chat | Self::Doc)
    }
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Heartbeat => "heartbeat",
            Self::Chat => "chat",
            Self::Doc => "doc",
            Self::Automation => "automation",
            Self::Alert => "alert",
            Self::Command => "command",
            Self::Other => "other",
        };
        write!(f, "{name}")
    }
}
