//! Axum router setup for the jsontree server

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::{
    ServerState,
    handlers::{
        clear_document, export_document, export_paths, get_graph, health_check, index,
        load_document, search,
    },
    websocket::ws_handler,
};

/// Create the axum router with all routes
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(index))
        // WebSocket endpoint for live updates
        .route("/ws", get(ws_handler))
        .route("/api/health", get(health_check))
        .route("/api/graph", get(get_graph))
        .route("/api/document", post(load_document).delete(clear_document))
        .route("/api/search", get(search))
        .route("/api/export", get(export_document))
        .route("/api/export/paths", get(export_paths))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
