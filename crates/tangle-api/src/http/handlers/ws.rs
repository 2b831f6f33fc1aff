//! WebSocket handler for real-time chat event streaming.
//!
//! The `/ws/events` endpoint upgrades an HTTP connection to a WebSocket and
//! forwards every [`ChatEvent`] published on the [`EventBus`] as a JSON text
//! frame: message creations, session starts/ends, participant churn. Clients
//! use the feed to keep both "chat" and "mind" renderings live without
//! polling.
//!
//! Lagged receivers (when the client is too slow to keep up) are handled
//! gracefully: the handler logs a warning and continues receiving. The only
//! inbound frame the server understands is a `{"type":"ping"}` keep-alive.
//!
//! [`ChatEvent`]: tangle_types::event::ChatEvent
//! [`EventBus`]: tangle_core::event::bus::EventBus

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use crate::state::AppState;

/// Upgrade an HTTP request to a WebSocket connection for chat events.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

/// Core WebSocket connection handler.
///
/// Uses `tokio::select!` to multiplex between receiving events from the
/// event bus and incoming WebSocket frames from the client, keeping both
/// directions in a single task.
async fn handle_ws_connection(socket: WebSocket, state: AppState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let mut event_rx = state.event_bus.subscribe();

    loop {
        tokio::select! {
            // Forward bus events to the client.
            event_result = event_rx.recv() => {
                match event_result {
                    Ok(event) => {
                        match serde_json::to_string(&event) {
                            Ok(json) => {
                                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                                    // Client disconnected
                                    break;
                                }
                            }
                            Err(err) => {
                                tracing::warn!("Failed to serialize ChatEvent: {err}");
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            skipped = n,
                            "WebSocket subscriber lagged, skipping {n} events"
                        );
                        // The client misses some events but catches up with
                        // the next ones.
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        // Bus sender dropped (server shutting down)
                        break;
                    }
                }
            }

            // Drain client frames; answer pings, drop everything else.
            msg_result = ws_receiver.next() => {
                match msg_result {
                    Some(Ok(Message::Text(text))) => {
                        if is_ping(&text) {
                            let pong = r#"{"type":"pong"}"#;
                            if ws_sender.send(Message::Text(pong.into())).await.is_err() {
                                break;
                            }
                        } else {
                            tracing::debug!(raw = %text, "Ignoring unexpected WebSocket frame");
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        // Client disconnected
                        break;
                    }
                    Some(Err(err)) => {
                        tracing::debug!("WebSocket receive error: {err}");
                        break;
                    }
                    // Binary, ping, pong protocol frames are handled by axum/tungstenite
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::debug!("WebSocket connection closed");
}

fn is_ping(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text)
        .map(|v| v["type"] == "ping")
        .unwrap_or(false)
}
