//! Shared application state for the hub API server.
//!
//! [`AppState`] holds the hub configuration, the chain store handle, the
//! broadcast channel for accepted events, and the in-memory projections
//! the REST endpoints serve: a bounded ring of recent events, the search
//! index, and the per-source registry. Durable history lives in the chain
//! files; these projections exist so reads never replay the chain.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{RwLock, broadcast};

use omni_chain::ChainStore;
use omni_types::{EventId, EventKind, SignedEvent};

use crate::config::HubConfig;

/// Capacity of the broadcast channel for accepted events.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 256;

/// Maximum accepted events kept in the in-memory ring.
const EVENT_RING_CAPACITY: usize = 1024;

/// Maximum documents kept in the search index.
const DOC_INDEX_CAPACITY: usize = 4096;

/// An event the hub accepted, stamped with a server-side identity.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptedEvent {
    /// Server-assigned, time-ordered identifier.
    pub id: EventId,
    /// When the hub accepted the event.
    pub received_at: DateTime<Utc>,
    /// The verified envelope as received.
    #[serde(flatten)]
    pub event: SignedEvent,
}

/// One searchable document extracted from a `chat` or `doc` event.
#[derive(Debug, Clone, Serialize)]
pub struct IndexedDoc {
    /// The payload text.
    pub text: String,
    /// Emitting source.
    pub source: String,
    /// Project the document belongs to.
    pub project: String,
    /// Emitter timestamp (unix seconds).
    pub ts: i64,
}

/// Liveness record for one emitting source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    /// Source name as carried in the envelope.
    pub source: String,
    /// When the hub last accepted an event from this source.
    pub last_seen: DateTime<Utc>,
    /// Total events accepted from this source.
    pub events: u64,
    /// Payload of the most recent heartbeat, if any.
    pub last_heartbeat: Option<serde_json::Value>,
}

/// In-memory projections updated on every accepted event.
#[derive(Debug, Default)]
pub struct HubIndex {
    /// Recent accepted events, oldest first, capped.
    pub events: VecDeque<AcceptedEvent>,
    /// Search index over chat/doc text, oldest first, capped.
    pub docs: VecDeque<IndexedDoc>,
    /// Per-source liveness registry keyed by source name.
    pub sources: BTreeMap<String, SourceStatus>,
}

impl HubIndex {
    /// Record an accepted event in all projections.
    ///
    /// Returns the stamped [`AcceptedEvent`] for broadcasting.
    pub fn record(&mut self, event: SignedEvent) -> AcceptedEvent {
        let accepted = AcceptedEvent {
            id: EventId::new(),
            received_at: Utc::now(),
            event,
        };

        self.touch_source(&accepted);
        self.index_text(&accepted.event);

        if self.events.len() >= EVENT_RING_CAPACITY {
            self.events.pop_front();
        }
        self.events.push_back(accepted.clone());

        accepted
    }

    /// Update the source registry for an accepted event.
    fn touch_source(&mut self, accepted: &AcceptedEvent) {
        let entry = self
            .sources
            .entry(accepted.event.source.clone())
            .or_insert_with(|| SourceStatus {
                source: accepted.event.source.clone(),
                last_seen: accepted.received_at,
                events: 0,
                last_heartbeat: None,
            });
        entry.last_seen = accepted.received_at;
        entry.events = entry.events.saturating_add(1);
        if accepted.event.kind == EventKind::Heartbeat {
            entry.last_heartbeat = Some(accepted.event.payload.clone());
        }
    }

    /// Index searchable payload text for chat/doc events.
    fn index_text(&mut self, event: &SignedEvent) {
        if let Some(text) = event.indexable_text() {
            if self.docs.len() >= DOC_INDEX_CAPACITY {
                self.docs.pop_front();
            }
            self.docs.push_back(IndexedDoc {
                text: text.to_owned(),
                source: event.source.clone(),
                project: event.project.clone(),
                ts: event.ts,
            });
        }
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The
/// broadcast sender pushes accepted events to all connected `WebSocket`
/// clients; the index is a read-write lock protecting the projections.
pub struct AppState {
    /// Hub configuration (authorization, chain directory, bind address).
    pub config: HubConfig,
    /// The durable chain store.
    pub chain: ChainStore,
    /// Broadcast sender for accepted events.
    pub tx: broadcast::Sender<AcceptedEvent>,
    /// In-memory projections (ring, search index, source registry).
    pub index: RwLock<HubIndex>,
}

impl AppState {
    /// Create application state from a config and an open chain store.
    pub fn new(config: HubConfig, chain: ChainStore) -> Arc<Self> {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Arc::new(Self {
            config,
            chain,
            tx,
            index: RwLock::new(HubIndex::default()),
        })
    }

    /// Subscribe to the accepted-event broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<AcceptedEvent> {
        self.tx.subscribe()
    }

    /// Publish an accepted event to all connected clients.
    ///
    /// Returns the number of receivers that got the message. Zero simply
    /// means no `WebSocket` clients are connected.
    pub fn broadcast(&self, accepted: &AcceptedEvent) -> usize {
        self.tx.send(accepted.clone()).unwrap_or(0)
    }
}
