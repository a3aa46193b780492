//! HTTP and WebSocket handlers
//!
//! One WebSocket is one user: it is registered with the pairing core on
//! upgrade and retired when the socket closes, whichever side closes it.

use crate::{error::TransportError, state::ServerState};
use axum::{
    Json, Router,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
    routing::get,
};
use duet_protocol::{ConnectionId, ServerEvent};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::time::Duration;
use tokio::{sync::mpsc, time::timeout};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};

/// How long a closing socket may take to flush its last events
const CLOSE_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct JoinQuery {
    name: Option<String>,
}

/// Builds the router: `/` and `/ws` upgrade, `/health` and `/stats` report
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .route("/stats", get(stats))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn stats(State(state): State<ServerState>) -> impl IntoResponse {
    Json(state.coordinator.stats())
}

async fn ws_handler(
    State(state): State<ServerState>,
    Query(query): Query<JoinQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let name = state.config.display_name(query.name.as_deref());
    ws.on_upgrade(move |socket| handle_socket(state, name, socket))
}

/// Turns a raw frame into request text. Pings and pongs yield `None`.
fn parse_frame(frame: Result<Message, axum::Error>) -> Result<Option<String>, TransportError> {
    match frame? {
        Message::Text(text) => Ok(Some(text)),
        Message::Ping(_) | Message::Pong(_) => Ok(None),
        Message::Binary(_) => Err(TransportError::UnsupportedType),
        Message::Close(_) => Err(TransportError::Close),
    }
}

async fn handle_socket(state: ServerState, name: String, socket: WebSocket) {
    let id = ConnectionId(uuid::Uuid::new_v4());
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(state.config.outbound_capacity.max(1));

    if let Err(e) = state.coordinator.connect(id, name, tx) {
        error!(connection = %id, "rejecting connection: {}", TransportError::from(e));
        return;
    }

    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    error!(connection = %id, "serialize event failed: {e}");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text)).await.is_err() {
                return;
            }
        }
        // Every sender is gone, so the core is done with this connection.
        // Closing flushes our close frame or the reply to the client's.
        let _ = ws_tx.close().await;
    });

    while let Some(frame) = ws_rx.next().await {
        let text = match parse_frame(frame) {
            Ok(Some(text)) => text,
            Ok(None) => continue,
            Err(TransportError::Close) => break,
            Err(TransportError::UnsupportedType) => {
                warn!(connection = %id, "ignoring binary frame");
                continue;
            }
            Err(e) => {
                debug!(connection = %id, "socket error: {e}");
                break;
            }
        };
        if let Err(e) = state.coordinator.handle_message(id, &text) {
            warn!(connection = %id, "rejected request: {}", TransportError::from(e));
        }
    }

    info!(connection = %id, "socket closed");
    state.coordinator.disconnect(id);

    let abort = writer.abort_handle();
    match timeout(CLOSE_GRACE, writer).await {
        Ok(Err(e)) => debug!(connection = %id, "writer task failed: {e}"),
        Ok(Ok(())) => {}
        Err(_) => {
            debug!(connection = %id, "writer did not finish, aborting");
            abort.abort();
        }
    }
}
