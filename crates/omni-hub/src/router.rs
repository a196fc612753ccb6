//! Axum router construction for the hub API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the hub server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `POST /ingest` -- verify and accept a signed event
/// - `GET /search` -- substring search over indexed text
/// - `GET /api/events` -- query recent accepted events
/// - `GET /api/sources` -- per-source liveness registry
/// - `GET /ws/events` -- `WebSocket` accepted-event stream
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // Ingest
        .route("/ingest", post(handlers::ingest))
        // WebSocket
        .route("/ws/events", get(ws::ws_events))
        // REST API
        .route("/search", get(handlers::search))
        .route("/api/events", get(handlers::list_events))
        .route("/api/sources", get(handlers::list_sources))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
