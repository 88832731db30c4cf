//! jsontree core: JSON walker, tree layout, graph builder and path resolver

pub mod model;
pub mod error;
pub mod source;
pub mod walker;
pub mod layout;
pub mod graph;
pub mod builder;
pub mod resolver;
pub mod session;
pub mod export;
pub mod update;
pub mod config;
pub mod sample;


#[cfg(test)]
pub mod test_utils;

pub use model::{Segment, JsonPath, NodeKind, Position, GraphNode, GraphEdge, Bounds, GraphData};
pub use error::{BuildError, PathParseError, ConfigError, Limit};
pub use source::{JsonSource, Shape, SharedValue, SharedNode};
pub use walker::{BuildLimits, WalkEntry, walk};
pub use layout::{LayoutConfig, Layout, layout};
pub use graph::Graph;
pub use builder::{GraphBuilder, preview, PREVIEW_LIMIT, ROOT_LABEL};
pub use resolver::{MatchResult, MatchStrategy, resolve};
pub use session::{Session, SearchSession, LoadSummary};
pub use export::{to_canonical_text, to_compact_text, export_path_list};
pub use update::GraphUpdate;
pub use config::{JsonTreeConfig, ServerSection};
pub use sample::sample_document;
