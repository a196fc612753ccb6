//! Integration tests for the live event stream.
//!
//! These tests bind the full server to an ephemeral port, ingest signed
//! events over HTTP, and assert that connected `WebSocket` clients
//! receive the expected frames.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::StreamExt;
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use omni_chain::ChainStore;
use omni_hub::config::HubConfig;
use omni_hub::router::build_router;
use omni_hub::state::AppState;
use omni_sign::Signer;
use omni_types::{EventKind, SignedEvent};

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Serve a fresh hub on an ephemeral port. The temp dir guard must stay
/// alive for the duration of the test.
async fn serve_hub() -> (SocketAddr, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let chain = ChainStore::open(dir.path()).unwrap();
    let state = AppState::new(HubConfig::default(), chain);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = build_router(state);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (addr, dir)
}

fn signed_event(kind: EventKind, source: &str, payload: Value) -> SignedEvent {
    let signer = Signer::for_uid("UID-TEST");
    let mut event =
        SignedEvent::unsigned("UID-TEST", kind, source, "general", 1_700_000_000, 7, payload);
    signer.sign_event(&mut event).unwrap();
    event
}

async fn ingest(addr: SocketAddr, event: &SignedEvent) {
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/ingest"))
        .json(event)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
}

/// Next text frame from the stream, parsed as JSON.
async fn next_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_accepted_event_reaches_connected_client() {
    let (addr, _dir) = serve_hub().await;

    let (mut ws, _) = connect_async(format!("ws://{addr}/ws/events"))
        .await
        .unwrap();
    // Give the upgraded handler a moment to subscribe.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let event = signed_event(
        EventKind::Chat,
        "laptop",
        serde_json::json!({"text": "streamed"}),
    );
    ingest(addr, &event).await;

    let frame = next_json(&mut ws).await;
    assert_eq!(frame["kind"], "chat");
    assert_eq!(frame["source"], "laptop");
    assert_eq!(frame["payload"]["text"], "streamed");
    // Server-side stamps are carried alongside the envelope.
    assert!(frame["id"].is_string());
    assert!(frame["received_at"].is_string());
}

#[tokio::test]
async fn test_replay_delivers_ring_backlog_on_connect() {
    let (addr, _dir) = serve_hub().await;

    for source in ["first", "second"] {
        let event = signed_event(EventKind::Alert, source, serde_json::json!({}));
        ingest(addr, &event).await;
    }

    // Events ingested before the connection arrive via replay, oldest
    // first.
    let (mut ws, _) = connect_async(format!("ws://{addr}/ws/events?replay=10"))
        .await
        .unwrap();

    let frame = next_json(&mut ws).await;
    assert_eq!(frame["source"], "first");
    let frame = next_json(&mut ws).await;
    assert_eq!(frame["source"], "second");
}

#[tokio::test]
async fn test_kind_filter_drops_other_kinds() {
    let (addr, _dir) = serve_hub().await;

    let chat = signed_event(EventKind::Chat, "laptop", serde_json::json!({"text": "x"}));
    let alert = signed_event(EventKind::Alert, "laptop", serde_json::json!({"msg": "y"}));
    ingest(addr, &chat).await;
    ingest(addr, &alert).await;

    // Replay the backlog through a kind filter: only the alert survives.
    let (mut ws, _) = connect_async(format!("ws://{addr}/ws/events?kind=alert&replay=10"))
        .await
        .unwrap();

    let frame = next_json(&mut ws).await;
    assert_eq!(frame["kind"], "alert");

    // The next frame is live, not a leaked chat from the backlog.
    let late = signed_event(EventKind::Alert, "phone", serde_json::json!({}));
    ingest(addr, &late).await;
    let frame = next_json(&mut ws).await;
    assert_eq!(frame["source"], "phone");
}
