//! REST API endpoint handlers for the hub server.
//!
//! All reads are served from the in-memory projections via the shared
//! [`AppState`]; the chain files are only written, never replayed, on the
//! request path.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `POST` | `/ingest` | Verify and accept a signed event |
//! | `GET` | `/search` | Substring search over indexed chat/doc text |
//! | `GET` | `/api/events` | Recent accepted events |
//! | `GET` | `/api/sources` | Per-source liveness registry |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use tracing::{info, warn};

use omni_types::{EventKind, SignedEvent};

use crate::error::HubError;
use crate::state::AppState;

/// Maximum characters of document text returned by search.
const SEARCH_SNIPPET_CHARS: usize = 512;

/// Default number of search results.
const SEARCH_DEFAULT_LIMIT: usize = 5;

/// Default and maximum limits for the events endpoint.
const EVENTS_DEFAULT_LIMIT: usize = 100;
/// Hard cap on the events endpoint limit.
const EVENTS_MAX_LIMIT: usize = 1000;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /search` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct SearchQuery {
    /// Substring to search for (case-insensitive).
    pub q: String,
    /// Project scope (default `general`).
    pub project: Option<String>,
    /// Maximum number of results (default 5).
    pub n: Option<usize>,
}

/// Query parameters for the `GET /api/events` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct EventsQuery {
    /// Filter by event kind.
    pub kind: Option<EventKind>,
    /// Filter by source name.
    pub source: Option<String>,
    /// Filter by project.
    pub project: Option<String>,
    /// Maximum number of events to return (default 100, max 1000).
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// POST /ingest -- verify and accept a signed event
// ---------------------------------------------------------------------------

/// Accept one signed event.
///
/// The pipeline: parse, verify the signature against the key derived from
/// the envelope's own `uid`, check the uid against the authorized set,
/// append to the chain, update the projections, broadcast. A rejection at
/// any step leaves no trace in the chain.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<serde_json::Value>,
) -> Result<impl IntoResponse, HubError> {
    let event: SignedEvent =
        serde_json::from_value(raw).map_err(|e| HubError::Malformed(e.to_string()))?;

    if let Err(e) = omni_sign::verify_event(&event) {
        warn!(uid = event.uid, source = event.source, error = %e, "event rejected");
        return Err(HubError::BadSignature);
    }

    if !state.config.is_authorized(&event.uid) {
        warn!(uid = event.uid, "event from unauthorized uid");
        return Err(HubError::UnauthorizedUid(event.uid));
    }

    state.chain.append_event(&event)?;

    let accepted = {
        let mut index = state.index.write().await;
        index.record(event)
    };
    let receivers = state.broadcast(&accepted);

    info!(
        id = %accepted.id,
        kind = %accepted.event.kind,
        source = accepted.event.source,
        project = accepted.event.project,
        ws_receivers = receivers,
        "event accepted"
    );

    Ok(Json(serde_json::json!({"ok": true})))
}

// ---------------------------------------------------------------------------
// GET /search -- substring search over indexed text
// ---------------------------------------------------------------------------

/// Search indexed chat/doc text within a project.
///
/// Case-insensitive substring match, ordered by emitter timestamp
/// descending. Document text is truncated to 512 characters in
/// responses.
///
/// # Query Parameters
///
/// - `q`: the substring to match (required)
/// - `project`: project scope (default `general`)
/// - `n`: maximum results (default 5)
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<impl IntoResponse, HubError> {
    let project = params.project.as_deref().unwrap_or("general");
    let needle = params.q.to_lowercase();
    let limit = params.n.unwrap_or(SEARCH_DEFAULT_LIMIT);

    let index = state.index.read().await;
    let mut matches: Vec<_> = index
        .docs
        .iter()
        .filter(|doc| doc.project == project && doc.text.to_lowercase().contains(&needle))
        .collect();
    // Order by emitter timestamp, not acceptance order: delayed delivery
    // must not float older documents above newer ones.
    matches.sort_by_key(|doc| core::cmp::Reverse(doc.ts));

    let results: Vec<serde_json::Value> = matches
        .into_iter()
        .take(limit)
        .map(|doc| {
            let snippet: String = doc.text.chars().take(SEARCH_SNIPPET_CHARS).collect();
            serde_json::json!({
                "text": snippet,
                "meta": {
                    "source": doc.source,
                    "project": doc.project,
                    "ts": doc.ts,
                },
            })
        })
        .collect();

    Ok(Json(serde_json::json!({"results": results})))
}

// ---------------------------------------------------------------------------
// GET /api/events -- recent accepted events
// ---------------------------------------------------------------------------

/// Return recent accepted events, newest first.
///
/// # Query Parameters
///
/// - `kind`: filter by event kind
/// - `source`: filter by source name
/// - `project`: filter by project
/// - `limit`: maximum number of events (default 100, max 1000)
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Result<impl IntoResponse, HubError> {
    let limit = params.limit.unwrap_or(EVENTS_DEFAULT_LIMIT).min(EVENTS_MAX_LIMIT);

    let index = state.index.read().await;
    let events: Vec<serde_json::Value> = index
        .events
        .iter()
        .rev()
        .filter(|e| {
            if let Some(kind) = params.kind
                && e.event.kind != kind
            {
                return false;
            }
            if let Some(ref source) = params.source
                && &e.event.source != source
            {
                return false;
            }
            if let Some(ref project) = params.project
                && &e.event.project != project
            {
                return false;
            }
            true
        })
        .take(limit)
        .map(|e| serde_json::to_value(e).unwrap_or_default())
        .collect();

    Ok(Json(serde_json::json!({
        "count": events.len(),
        "events": events,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/sources -- per-source liveness registry
// ---------------------------------------------------------------------------

/// Return the per-source registry: last-seen timestamps, event counts,
/// and the latest heartbeat payload for each known source.
pub async fn list_sources(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HubError> {
    let index = state.index.read().await;
    let sources: Vec<serde_json::Value> = index
        .sources
        .values()
        .map(|s| serde_json::to_value(s).unwrap_or_default())
        .collect();

    Ok(Json(serde_json::json!({
        "count": sources.len(),
        "sources": sources,
    })))
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing hub status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let index = state.index.read().await;
    let event_count = index.events.len();
    let doc_count = index.docs.len();
    let source_count = index.sources.len();
    let chain_dir = state.chain.dir().display().to_string();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Omnihub</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .status {{ color: #3fb950; font-weight: bold; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Omnihub</h1>
    <p class="subtitle">Signed event ingest and notarization hub</p>

    <p>Status: <span class="status">RUNNING</span></p>

    <div>
        <div class="metric">
            <div class="label">Recent events</div>
            <div class="value">{event_count}</div>
        </div>
        <div class="metric">
            <div class="label">Indexed docs</div>
            <div class="value">{doc_count}</div>
        </div>
        <div class="metric">
            <div class="label">Sources</div>
            <div class="value">{source_count}</div>
        </div>
    </div>

    <p>Chain directory: <code>{chain_dir}</code></p>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li>POST <code>/ingest</code> -- Submit a signed event</li>
        <li>GET <a href="/search?q=">/search</a> -- Search indexed text (?q=&amp;project=&amp;n=)</li>
        <li>GET <a href="/api/events">/api/events</a> -- Recent events (?kind=&amp;source=&amp;project=&amp;limit=)</li>
        <li>GET <a href="/api/sources">/api/sources</a> -- Source liveness registry</li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li><code>ws://host:port/ws/events</code> -- Live accepted-event stream</li>
    </ul>
</body>
</html>"#
    ))
}
