//! Visualization session: source document, current graph and search state

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::builder::GraphBuilder;
use crate::error::BuildError;
use crate::export;
use crate::graph::Graph;
use crate::resolver::{MatchResult, resolve};
use crate::source::JsonSource;

/// Search state around the stateless resolver.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SearchSession {
    /// No active query, nothing highlighted.
    #[default]
    Idle,
    /// The last submitted query and what it resolved to.
    Queried { query: String, result: MatchResult },
}

impl SearchSession {
    /// Evaluate `query` against `graph`. A blank query returns to `Idle`.
    pub fn submit(&mut self, query: &str, graph: &Graph) -> MatchResult {
        if query.trim().is_empty() {
            *self = SearchSession::Idle;
            return MatchResult::no_match();
        }
        let result = resolve(query, graph);
        *self = SearchSession::Queried {
            query: query.to_string(),
            result: result.clone(),
        };
        result
    }

    pub fn reset(&mut self) {
        *self = SearchSession::Idle;
    }

    /// Node id to highlight, if the last query matched.
    pub fn highlighted(&self) -> Option<&str> {
        match self {
            SearchSession::Idle => None,
            SearchSession::Queried { result, .. } => result.node_id(),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SearchSession::Idle)
    }
}

/// Summary of an accepted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub generation: u64,
    pub node_count: usize,
    pub edge_count: usize,
}

/// Owns the current document and its graph.
///
/// The graph is replaced wholesale on every accepted document. A rejected
/// document leaves the previous graph and search state untouched. Loads and
/// searches both take `&mut self`, so a search always sees the graph of the
/// most recently completed load.
#[derive(Debug)]
pub struct Session {
    builder: GraphBuilder,
    source: Option<Value>,
    graph: Graph,
    search: SearchSession,
    generation: u64,
}

impl Session {
    pub fn new(builder: GraphBuilder) -> Self {
        Self {
            builder,
            source: None,
            graph: Graph::new(),
            search: SearchSession::Idle,
            generation: 0,
        }
    }

    pub fn load_text(&mut self, text: &str) -> Result<LoadSummary, BuildError> {
        let value: Value = serde_json::from_str(text).map_err(|e| {
            let err = BuildError::from(e);
            warn!("Rejected document: {}", err);
            err
        })?;
        self.load_value(value)
    }

    pub fn load_value(&mut self, value: Value) -> Result<LoadSummary, BuildError> {
        let graph = self.builder.build(&value).inspect_err(|e| {
            warn!("Rejected document: {}", e);
        })?;
        Ok(self.install(value, graph))
    }

    /// Load an in-memory document, which may turn out to be cyclic.
    pub fn load_source<S: JsonSource>(&mut self, source: S) -> Result<LoadSummary, BuildError> {
        let graph = self.builder.build_source(source).inspect_err(|e| {
            warn!("Rejected document: {}", e);
        })?;
        let value = graph.root().map(|n| n.value.clone()).unwrap_or(Value::Null);
        Ok(self.install(value, graph))
    }

    fn install(&mut self, value: Value, graph: Graph) -> LoadSummary {
        self.source = Some(value);
        self.graph = graph;
        self.search.reset();
        self.generation += 1;
        info!(
            "Loaded document #{}: {} nodes, {} edges",
            self.generation,
            self.graph.node_count(),
            self.graph.edge_count()
        );
        self.summary()
    }

    /// Drop the document and return to an empty graph.
    pub fn clear(&mut self) -> LoadSummary {
        self.source = None;
        self.graph = Graph::new();
        self.search.reset();
        self.generation += 1;
        debug!("Session cleared");
        self.summary()
    }

    pub fn search(&mut self, query: &str) -> MatchResult {
        let result = self.search.submit(query, &self.graph);
        debug!(query, matched = ?result.matched, "Search resolved");
        result
    }

    pub fn summary(&self) -> LoadSummary {
        LoadSummary {
            generation: self.generation,
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn source(&self) -> Option<&Value> {
        self.source.as_ref()
    }

    pub fn search_state(&self) -> &SearchSession {
        &self.search
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.search.highlighted()
    }

    /// Incremented on every load or clear.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Canonical text of the source document, for download.
    pub fn export_source(&self) -> Option<String> {
        self.source.as_ref().map(export::to_canonical_text)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(GraphBuilder::default())
    }
}
