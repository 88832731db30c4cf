//! JSON document → positioned node/edge graph

use serde_json::Value;
use tracing::debug;

use crate::config::JsonTreeConfig;
use crate::error::BuildError;
use crate::graph::Graph;
use crate::layout::{LayoutConfig, layout};
use crate::model::{GraphNode, Position, Segment};
use crate::source::JsonSource;
use crate::walker::{BuildLimits, WalkEntry, walk};

/// Longest scalar preview, in characters.
pub const PREVIEW_LIMIT: usize = 120;

/// Label shown on the root node.
pub const ROOT_LABEL: &str = "$";

/// Composes the walker and the layout engine into a [`Graph`].
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    layout: LayoutConfig,
    limits: BuildLimits,
}

impl GraphBuilder {
    pub fn new(layout: LayoutConfig, limits: BuildLimits) -> Self {
        Self { layout, limits }
    }

    pub fn from_config(config: &JsonTreeConfig) -> Self {
        Self::new(config.layout, config.limits)
    }

    pub fn limits(&self) -> &BuildLimits {
        &self.limits
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn build(&self, value: &Value) -> Result<Graph, BuildError> {
        self.build_source(value)
    }

    /// Parse `text` and build its graph, returning the parsed document too.
    pub fn build_text(&self, text: &str) -> Result<(Value, Graph), BuildError> {
        let value: Value = serde_json::from_str(text)?;
        let graph = self.build(&value)?;
        Ok((value, graph))
    }

    /// Build from any walkable source. Either the whole graph is produced or
    /// nothing is.
    pub fn build_source<S: JsonSource>(&self, source: S) -> Result<Graph, BuildError> {
        let entries = walk(source, &self.limits)?;
        let layout = layout(&entries, &self.layout);

        let mut graph = Graph::with_capacity(entries.len());
        let indices: Vec<_> = entries
            .iter()
            .zip(layout.positions())
            .map(|(entry, &position)| graph.add_node(to_node(entry, position)))
            .collect();
        for (index, entry) in entries.iter().enumerate() {
            if let Some(parent) = entry.parent {
                graph.add_edge(indices[parent], indices[index]);
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Built JSON graph"
        );
        Ok(graph)
    }
}

fn to_node<S: JsonSource>(entry: &WalkEntry<S>, position: Position) -> GraphNode {
    let value = entry.source.to_value();
    let label = match entry.path.last() {
        None => ROOT_LABEL.to_string(),
        Some(Segment::Key(key)) => key.clone(),
        Some(Segment::Index(index)) => index.to_string(),
    };
    let scalar_preview = (!value.is_object() && !value.is_array()).then(|| preview(&value));

    GraphNode {
        id: entry.path.to_string(),
        path: entry.path.clone(),
        label,
        kind: entry.kind,
        value,
        depth: entry.depth,
        position,
        child_count: entry.children.len(),
        preview: scalar_preview,
    }
}

/// Short display text for a scalar value.
pub fn preview(value: &Value) -> String {
    match value {
        Value::String(s) => truncate(s, PREVIEW_LIMIT),
        other => other.to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", &s[..cut]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;
    use crate::source::SharedValue;
    use serde_json::json;

    #[test]
    fn test_one_node_per_value() {
        let doc = json!({"user": {"id": 1, "tags": ["a", "b"], "meta": {}}});
        let graph = GraphBuilder::default().build(&doc).unwrap();
        assert_eq!(graph.node_count(), 7);
        assert_eq!(graph.edge_count(), 6);
        assert!(graph.is_tree());
    }

    #[test]
    fn test_empty_object_is_single_root() {
        let graph = GraphBuilder::default().build(&json!({})).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        let root = graph.root().unwrap();
        assert_eq!(root.label, ROOT_LABEL);
        assert_eq!(root.depth, 0);
        assert!(root.preview.is_none());
    }

    #[test]
    fn test_node_attributes() {
        let doc = json!({"items": [{"name": "item1"}], "n": null});
        let graph = GraphBuilder::default().build(&doc).unwrap();

        let items = graph.node("items").unwrap();
        assert_eq!(items.kind, NodeKind::Array);
        assert_eq!(items.child_count, 1);
        assert_eq!(items.value, json!([{"name": "item1"}]));

        let element = graph.node("items[0]").unwrap();
        assert_eq!(element.label, "0");
        assert_eq!(element.kind, NodeKind::Object);

        let name = graph.node("items[0].name").unwrap();
        assert_eq!(name.label, "name");
        assert_eq!(name.kind, NodeKind::Scalar);
        assert_eq!(name.preview.as_deref(), Some("item1"));
        assert_eq!(name.depth, 3);

        assert_eq!(graph.node("n").unwrap().preview.as_deref(), Some("null"));
    }

    #[test]
    fn test_scalar_root_has_preview() {
        let graph = GraphBuilder::default().build(&json!(42)).unwrap();
        assert_eq!(graph.root().unwrap().preview.as_deref(), Some("42"));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let doc = json!({"z": [3, {"y": 2}], "a": {"k": "v"}});
        let builder = GraphBuilder::default();
        let first = builder.build(&doc).unwrap().snapshot();
        let second = builder.build(&doc).unwrap().snapshot();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cycle_produces_no_graph() {
        let root = SharedValue::object();
        root.insert("ok", SharedValue::scalar(json!(1)));
        root.insert("loop", root.clone());
        let err = GraphBuilder::default().build_source(root).unwrap_err();
        assert!(matches!(err, BuildError::Cyclic { .. }));
    }

    #[test]
    fn test_shared_source_builds_like_value() {
        let doc = json!({"a": [1, {"b": "c"}]});
        let builder = GraphBuilder::default();
        let from_value = builder.build(&doc).unwrap().snapshot();
        let from_shared = builder
            .build_source(SharedValue::from_value(&doc))
            .unwrap()
            .snapshot();
        assert_eq!(from_value, from_shared);
    }

    #[test]
    fn test_build_text_parse_error() {
        let err = GraphBuilder::default().build_text("{\"a\": ").unwrap_err();
        assert!(matches!(err, BuildError::Parse { .. }));
    }

    #[test]
    fn test_limits_abort_build() {
        let builder = GraphBuilder::new(
            LayoutConfig::default(),
            BuildLimits {
                max_depth: 256,
                max_nodes: 2,
            },
        );
        let err = builder.build(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, BuildError::TooLarge { .. }));
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(PREVIEW_LIMIT + 5);
        let text = preview(&json!(long));
        assert_eq!(text.chars().count(), PREVIEW_LIMIT + 1);
        assert!(text.ends_with('…'));
        assert_eq!(preview(&json!("short")), "short");
    }
}
