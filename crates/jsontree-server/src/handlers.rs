//! REST API handlers for the jsontree server

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use jsontree_core::{
    BuildError, GraphData, GraphUpdate, LoadSummary, MatchStrategy, export_path_list,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ServerState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Landing document listing the API
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub endpoints: &'static [&'static str],
}

/// Routes served by [`crate::router::create_router`].
pub const ENDPOINTS: &[&str] = &[
    "GET /ws",
    "GET /api/health",
    "GET /api/graph",
    "POST /api/document",
    "DELETE /api/document",
    "GET /api/search?q=",
    "GET /api/export",
    "GET /api/export/paths",
];

/// Current graph plus the session generation it belongs to
#[derive(Debug, Serialize)]
pub struct GraphResponse {
    pub generation: u64,
    pub highlighted: Option<String>,
    #[serde(flatten)]
    pub graph: GraphData,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub matched: Option<String>,
    pub had_match: bool,
    pub strategy: Option<MatchStrategy>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Errors returned to API clients as `{ "error": ... }`.
#[derive(Debug)]
pub enum ApiError {
    /// The body is not valid JSON.
    BadRequest(String),
    /// Valid JSON that cannot be graphed (cyclic or over the limits).
    Unprocessable(String),
    NotFound(String),
}

impl From<BuildError> for ApiError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Parse { .. } => ApiError::BadRequest(err.to_string()),
            BuildError::Cyclic { .. } | BuildError::TooLarge { .. } => {
                ApiError::Unprocessable(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        name: "jsontree",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ENDPOINTS,
    })
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_graph(State(state): State<Arc<ServerState>>) -> Json<GraphResponse> {
    let session = state.session.read().await;
    Json(GraphResponse {
        generation: session.generation(),
        highlighted: session.highlighted().map(str::to_string),
        graph: session.graph().snapshot(),
    })
}

/// Replace the document with the request body.
pub async fn load_document(
    State(state): State<Arc<ServerState>>,
    body: String,
) -> Result<Json<LoadSummary>, ApiError> {
    let mut session = state.session.write().await;
    match session.load_text(&body) {
        Ok(summary) => {
            state.publish(&GraphUpdate::rebuilt(&session));
            Ok(Json(summary))
        }
        Err(err) => {
            state.publish(&GraphUpdate::failed(&err));
            Err(err.into())
        }
    }
}

pub async fn clear_document(State(state): State<Arc<ServerState>>) -> Json<LoadSummary> {
    let mut session = state.session.write().await;
    let summary = session.clear();
    state.publish(&GraphUpdate::cleared(&session));
    Json(summary)
}

pub async fn search(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let mut session = state.session.write().await;
    let result = session.search(&params.q);
    debug!("Search {:?} -> {:?}", params.q, result.matched);
    state.publish(&GraphUpdate::highlight(&session, &result));
    Json(SearchResponse {
        had_match: result.had_match(),
        matched: result.matched,
        strategy: result.strategy,
    })
}

/// Download the source document as pretty JSON.
pub async fn export_document(State(state): State<Arc<ServerState>>) -> Result<Response, ApiError> {
    let session = state.session.read().await;
    let text = session
        .export_source()
        .ok_or_else(|| ApiError::NotFound("No document loaded".to_string()))?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"export.json\""),
        ],
        text,
    )
        .into_response())
}

/// Every node path, one per line.
pub async fn export_paths(State(state): State<Arc<ServerState>>) -> Result<Response, ApiError> {
    let session = state.session.read().await;
    if session.source().is_none() {
        return Err(ApiError::NotFound("No document loaded".to_string()));
    }
    let text = export_path_list(session.graph());
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response())
}
