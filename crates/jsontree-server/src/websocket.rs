//! WebSocket handling for live graph updates

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use jsontree_core::{GraphData, GraphUpdate};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::ServerState;

/// Messages exchanged directly with one client. Broadcast
/// [`GraphUpdate`]s are forwarded alongside these as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Client requests the full graph
    RequestFullGraph,
    /// Server sends the full graph
    FullGraph {
        generation: u64,
        highlighted: Option<String>,
        graph: GraphData,
    },
    /// Client submits a path query; the result is broadcast as a highlight
    Search { query: String },
    Ping,
    Pong,
    Error { message: String },
}

/// Handle WebSocket upgrade requests
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn full_graph(state: &ServerState) -> WsMessage {
    let session = state.session.read().await;
    WsMessage::FullGraph {
        generation: session.generation(),
        highlighted: session.highlighted().map(str::to_string),
        graph: session.graph().snapshot(),
    }
}

/// Apply a client message. Returns a reply meant for that client only.
async fn handle_client_message(msg: WsMessage, state: &ServerState) -> Option<WsMessage> {
    match msg {
        WsMessage::RequestFullGraph => {
            debug!("Client requested full graph");
            Some(full_graph(state).await)
        }
        WsMessage::Search { query } => {
            let update = {
                let mut session = state.session.write().await;
                let result = session.search(&query);
                GraphUpdate::highlight(&session, &result)
            };
            state.publish(&update);
            None
        }
        WsMessage::Ping => Some(WsMessage::Pong),
        other => {
            debug!("Ignoring client message: {:?}", other);
            None
        }
    }
}

fn encode(msg: &WsMessage) -> Option<String> {
    match serde_json::to_string(msg) {
        Ok(json) => Some(json),
        Err(e) => {
            warn!("Failed to serialize WebSocket message: {}", e);
            None
        }
    }
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<ServerState>) {
    info!("New WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();
    // Subscribe before the snapshot so no rebuild falls in between.
    let mut rx = state.subscribe();

    if let Some(json) = encode(&full_graph(&state).await) {
        if sender.send(Message::Text(json)).await.is_err() {
            warn!("Failed to send initial full graph to WebSocket client");
            return;
        }
    }

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        debug!("WebSocket receive error: {}", e);
                        break;
                    }
                };
                let reply = match serde_json::from_str::<WsMessage>(&text) {
                    Ok(msg) => handle_client_message(msg, &state).await,
                    Err(e) => {
                        warn!("Failed to parse WebSocket message: {}", e);
                        Some(WsMessage::Error { message: e.to_string() })
                    }
                };
                if let Some(json) = reply.as_ref().and_then(encode) {
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
            }
            update = rx.recv() => match update {
                Ok(json) => {
                    if sender.send(Message::Text(json)).await.is_err() {
                        debug!("Failed to send update to WebSocket client");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Missed rebuilds make the client's view stale; resend everything.
                    warn!("WebSocket client lagged behind by {} updates", skipped);
                    if let Some(json) = encode(&full_graph(&state).await) {
                        if sender.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    info!("WebSocket connection closed");
}
