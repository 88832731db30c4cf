//! HTTP + WebSocket server handing the JSON graph to the browser renderer

pub mod router;
pub mod handlers;
pub mod websocket;

use std::sync::Arc;

use jsontree_core::{GraphUpdate, Session};
use tokio::sync::{RwLock, broadcast};
use tracing::{info, warn};

/// How many updates a slow WebSocket client may fall behind.
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// State shared by every handler and the file watcher.
pub struct ServerState {
    pub session: Arc<RwLock<Session>>,
    /// Serialized [`GraphUpdate`]s for connected clients.
    pub update_tx: broadcast::Sender<String>,
}

impl ServerState {
    pub fn new(session: Session) -> Self {
        let (update_tx, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            session: Arc::new(RwLock::new(session)),
            update_tx,
        }
    }

    /// Send a raw message to all subscribers. Returns how many received it.
    pub fn broadcast(&self, message: String) -> usize {
        // No receivers just means no client is connected.
        self.update_tx.send(message).unwrap_or(0)
    }

    pub fn publish(&self, update: &GraphUpdate) -> usize {
        match update.to_json() {
            Ok(json) => self.broadcast(json),
            Err(e) => {
                warn!("Failed to serialize graph update: {}", e);
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.update_tx.subscribe()
    }
}

/// Server bind address.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7890,
        }
    }
}

pub struct JsonTreeServer {
    state: Arc<ServerState>,
    config: ServerConfig,
}

impl JsonTreeServer {
    pub fn new(session: Session, config: ServerConfig) -> Self {
        Self {
            state: Arc::new(ServerState::new(session)),
            config,
        }
    }

    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind and serve until the process is stopped.
    pub async fn start(self) -> anyhow::Result<()> {
        let addr = (self.config.host.as_str(), self.config.port);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("jsontree server listening on http://{}", listener.local_addr()?);

        let app = router::create_router(self.state);
        axum::serve(listener, app).await?;
        Ok(())
    }
}
