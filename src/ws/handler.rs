//! WebSocket upgrade handler

use std::collections::HashSet;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::ConnectionId;
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::ws::protocol::{decode_client_msg, ServerMsg};

/// Messages queued for one socket before senders wait
const OUTBOUND_CAPACITY: usize = 128;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id: ConnectionId = Uuid::new_v4();
    info!(conn = %conn_id, "New WebSocket connection");

    let (ws_sink, ws_stream) = socket.split();
    let (out_tx, out_rx) = mpsc::channel(OUTBOUND_CAPACITY);

    // Writer task: outbound queue -> WebSocket
    let writer_handle = tokio::spawn(write_loop(conn_id, ws_sink, out_rx));

    let joined = run_session(conn_id, &state, ws_stream, out_tx).await;

    // Departure never touches game state, it only detaches the connection
    for code in &joined {
        state.sessions.leave(conn_id, code);
    }

    writer_handle.abort();

    info!(conn = %conn_id, matches = joined.len(), "WebSocket connection closed");
}

/// Read frames until the client goes away. Returns the codes this connection joined.
async fn run_session(
    conn_id: ConnectionId,
    state: &AppState,
    mut ws_stream: SplitStream<WebSocket>,
    out_tx: mpsc::Sender<ServerMsg>,
) -> HashSet<String> {
    let rate_limiter = ConnectionRateLimiter::new(state.config.input_rate_limit);
    let mut joined = HashSet::new();
    let mut forwarders: Vec<JoinHandle<()>> = Vec::new();

    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_input() {
                    warn!(conn = %conn_id, "Rate limited input message");
                    continue;
                }

                let (code, msg) = match decode_client_msg(&text) {
                    Ok(decoded) => decoded,
                    Err(e) => {
                        warn!(conn = %conn_id, error = %e, "Dropping malformed client message");
                        continue;
                    }
                };

                let delivery = state.sessions.dispatch(conn_id, &code, msg);

                // Reply goes out before any broadcast from the new subscription
                if let Some(reply) = delivery.reply {
                    if out_tx.send(reply).await.is_err() {
                        debug!(conn = %conn_id, "Outbound channel closed");
                        break;
                    }
                }

                if let Some(events) = delivery.subscription {
                    forwarders.push(tokio::spawn(forward_events(
                        conn_id,
                        code.clone(),
                        events,
                        out_tx.clone(),
                    )));
                    joined.insert(code);
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(conn = %conn_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                debug!(conn = %conn_id, "Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(conn = %conn_id, "Received pong");
            }
            Ok(Message::Close(_)) => {
                info!(conn = %conn_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(conn = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    for forwarder in forwarders {
        forwarder.abort();
    }

    joined
}

/// Copy one room's broadcasts into this connection's outbound queue
async fn forward_events(
    conn_id: ConnectionId,
    code: String,
    mut events: broadcast::Receiver<ServerMsg>,
    out_tx: mpsc::Sender<ServerMsg>,
) {
    loop {
        match events.recv().await {
            Ok(msg) => {
                if out_tx.send(msg).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(
                    conn = %conn_id,
                    code = %code,
                    lagged_count = n,
                    "Client lagged, skipping {} updates", n
                );
                // Snapshots are full state, so the next one resynchronizes
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!(conn = %conn_id, code = %code, "Room channel closed");
                break;
            }
        }
    }
}

async fn write_loop(
    conn_id: ConnectionId,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut out_rx: mpsc::Receiver<ServerMsg>,
) {
    while let Some(msg) = out_rx.recv().await {
        if let Err(e) = send_msg(&mut ws_sink, &msg).await {
            debug!(conn = %conn_id, error = %e, "WebSocket send failed");
            break;
        }
    }
}

/// Send a message over WebSocket
async fn send_msg(sink: &mut SplitSink<WebSocket, Message>, msg: &ServerMsg) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
