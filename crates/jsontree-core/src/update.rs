//! Messages pushed to the renderer when the session changes

use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::model::GraphData;
use crate::resolver::MatchResult;
use crate::session::Session;

/// A change to broadcast. The renderer replaces its whole view on
/// `GraphRebuilt`; no incremental diffs are sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GraphUpdate {
    GraphRebuilt { generation: u64, graph: GraphData },
    Highlight {
        generation: u64,
        matched: Option<String>,
        had_match: bool,
    },
    Cleared { generation: u64 },
    /// A new document was rejected; the previous graph stays on screen.
    BuildFailed { message: String },
}

impl GraphUpdate {
    pub fn rebuilt(session: &Session) -> Self {
        GraphUpdate::GraphRebuilt {
            generation: session.generation(),
            graph: session.graph().snapshot(),
        }
    }

    pub fn highlight(session: &Session, result: &MatchResult) -> Self {
        GraphUpdate::Highlight {
            generation: session.generation(),
            matched: result.matched.clone(),
            had_match: result.had_match(),
        }
    }

    pub fn cleared(session: &Session) -> Self {
        GraphUpdate::Cleared {
            generation: session.generation(),
        }
    }

    pub fn failed(err: &BuildError) -> Self {
        GraphUpdate::BuildFailed {
            message: err.to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
