//! `WebSocket` handler for live accepted-event streaming.
//!
//! Clients connect to `GET /ws/events` and receive one JSON-encoded
//! [`AcceptedEvent`] text frame per event the hub accepts. Two query
//! parameters shape the stream:
//!
//! - `kind`: only forward events of this kind
//! - `replay`: before going live, replay up to this many of the most
//!   recent events from the in-memory ring, oldest first
//!
//! All connected clients share one broadcast channel; a client that falls
//! behind has lagged messages silently skipped and resumes from the most
//! recent event.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use serde::Deserialize;
use tracing::{debug, warn};

use omni_types::EventKind;

use crate::state::{AcceptedEvent, AppState};

/// Query parameters for the `GET /ws/events` endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WsQuery {
    /// Only stream events of this kind.
    pub kind: Option<EventKind>,
    /// Number of recent events to replay from the ring before going live.
    #[serde(default)]
    pub replay: usize,
}

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming accepted events.
///
/// # Route
///
/// `GET /ws/events?kind=&replay=`
pub async fn ws_events(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state, params))
}

/// Handle the `WebSocket` lifecycle: replay the requested backlog, then
/// forward broadcast events until the client goes away.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, params: WsQuery) {
    debug!(replay = params.replay, "WebSocket client connected");

    // Subscribe before snapshotting the backlog so nothing falls in the
    // gap; an event racing the snapshot may be delivered twice.
    let mut rx = state.subscribe();

    if params.replay > 0 {
        let backlog: Vec<AcceptedEvent> = {
            let index = state.index.read().await;
            let skip = index.events.len().saturating_sub(params.replay);
            index.events.iter().skip(skip).cloned().collect()
        };
        for accepted in &backlog {
            if !forward(&mut socket, accepted, params.kind).await {
                return;
            }
        }
    }

    loop {
        tokio::select! {
            // Receive an accepted event from the ingest path.
            result = rx.recv() => {
                match result {
                    Ok(accepted) => {
                        if !forward(&mut socket, &accepted, params.kind).await {
                            return;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            // Check if the client sent a close frame or disconnected.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    _ => {
                        // Ignore other message types (text, binary from client).
                    }
                }
            }
        }
    }
}

/// Send one event as a text frame, honoring the kind filter.
///
/// Returns `false` once the client is gone; filtered-out events and
/// serialization failures leave the connection open.
async fn forward(
    socket: &mut WebSocket,
    accepted: &AcceptedEvent,
    kind: Option<EventKind>,
) -> bool {
    if let Some(kind) = kind
        && accepted.event.kind != kind
    {
        return true;
    }

    let json = match serde_json::to_string(accepted) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize accepted event: {e}");
            return true;
        }
    };

    if socket.send(Message::Text(json.into())).await.is_err() {
        debug!("WebSocket client disconnected (send failed)");
        return false;
    }
    true
}
