//! WebSocket handlers
//!
//! Two endpoints: the signaling socket (`/ws`) that carries JSON control
//! messages, and the media socket (`/stream/:id`) that carries the raw
//! transcoded byte stream to a viewer. A dropped socket always runs the full
//! disconnect cleanup, whatever state the connection was in.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};

use crate::error::Error;
use crate::registry::{ConnectionId, StreamId};
use crate::session::ConnectionState;
use crate::signal::ClientMessage;

use super::AppState;

/// Upgrade handler for the signaling socket
pub async fn signaling_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_signaling(socket, state))
}

/// Upgrade handler for the media socket
pub async fn media_upgrade(
    ws: WebSocketUpgrade,
    Path(stream_id): Path<StreamId>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_media(socket, state, stream_id))
}

/// Drive one signaling connection from accept to cleanup
async fn handle_signaling(socket: WebSocket, state: Arc<AppState>) {
    let conn = ConnectionId::generate();
    let (tx, mut outbound) = mpsc::unbounded_channel();
    state.peers.register(conn, tx).await;

    let mut conn_state = ConnectionState::new(conn);
    let (mut ws_tx, mut ws_rx) = socket.split();

    tracing::info!(connection = %conn, "Signaling connection opened");

    loop {
        tokio::select! {
            // Outbound: replies, relays, broadcasts queued for this connection
            msg = outbound.recv() => {
                let Some(msg) = msg else { break };
                match serde_json::to_string(&msg) {
                    Ok(text) => {
                        if ws_tx.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(connection = %conn, error = %e, "Reply serialization failed");
                    }
                }
            }
            // Inbound: signaling messages from the client
            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        let msg = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(msg) => msg,
                            Err(e) => {
                                tracing::debug!(connection = %conn, error = %e, "Unparseable message");
                                continue;
                            }
                        };

                        match state.coordinator.handle_message(&mut conn_state, msg).await {
                            Ok(()) => {}
                            Err(Error::TranscodeSpawn(_)) => {
                                // Reported to the client once; close the connection
                                break;
                            }
                            Err(e) => {
                                tracing::debug!(connection = %conn, error = %e, "Request rejected");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_tx.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(connection = %conn, error = %e, "Socket error");
                        break;
                    }
                    _ => {} // Binary frames are not part of the signaling protocol
                }
            }
        }
    }

    // Cleanup must run whatever broke the loop
    state.coordinator.disconnect(conn).await;
    conn_state.set_disconnected();
    tracing::info!(connection = %conn, "Signaling connection closed");
}

/// Forward a stream's transcoded bytes to one media socket
async fn handle_media(socket: WebSocket, state: Arc<AppState>, stream_id: StreamId) {
    let mut media = match state.registry.subscribe_media(stream_id).await {
        Ok(rx) => rx,
        Err(e) => {
            tracing::debug!(stream = %stream_id, error = %e, "Media subscribe rejected");
            return;
        }
    };

    let (mut ws_tx, mut ws_rx) = socket.split();
    tracing::debug!(stream = %stream_id, "Media socket opened");

    loop {
        tokio::select! {
            chunk = media.recv() => {
                match chunk {
                    Ok(chunk) => {
                        if ws_tx.send(Message::Binary(chunk.to_vec())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Slow client: skip ahead rather than buffering forever
                        tracing::warn!(stream = %stream_id, missed = n, "Media client lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_tx.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!(stream = %stream_id, "Media socket closed");
}
