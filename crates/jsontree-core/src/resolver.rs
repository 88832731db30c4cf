//! Path-expression → matched node
//!
//! Resolution is a pure function of the query and the current graph. The
//! strategies are tried in order and the first one that finds a node wins:
//!
//! 1. exact: the query (minus a leading `$.` or `$`) equals a node id
//! 2. loose: equal segment by segment after dropping one leading `.` from the
//!    query, with all-digit dotted query segments read as indices
//!    (`items.0` ≡ `items[0]`)
//! 3. value prefix: the first scalar node lying beneath the query, so
//!    `user.address.` finds the first value inside `user.address` and
//!    `user.items.` the first value inside `user.items[0]`
//!
//! Within a strategy, nodes are considered in walk order.

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::model::{JsonPath, NodeKind, Segment};

/// Which strategy produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    Loose,
    ValuePrefix,
}

/// Outcome of resolving a query. No match is a normal result, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: Option<String>,
    pub strategy: Option<MatchStrategy>,
}

impl MatchResult {
    pub fn no_match() -> Self {
        Self::default()
    }

    fn found(id: &str, strategy: MatchStrategy) -> Self {
        Self {
            matched: Some(id.to_string()),
            strategy: Some(strategy),
        }
    }

    pub fn had_match(&self) -> bool {
        self.matched.is_some()
    }

    pub fn node_id(&self) -> Option<&str> {
        self.matched.as_deref()
    }
}

/// Resolve `query` against `graph`.
pub fn resolve(query: &str, graph: &Graph) -> MatchResult {
    let query = strip_root_marker(query.trim());
    if query.is_empty() {
        return MatchResult::no_match();
    }

    if graph.contains(query) {
        return MatchResult::found(query, MatchStrategy::Exact);
    }

    if let Some(wanted) = query_path(query) {
        let found = graph
            .nodes()
            .find(|n| segments_match(wanted.segments(), n.path.segments()));
        if let Some(node) = found {
            return MatchResult::found(&node.id, MatchStrategy::Loose);
        }
    }

    let prefix = query.strip_suffix(['.', '[']).unwrap_or(query);
    let Some(prefix) = query_path(prefix) else {
        return MatchResult::no_match();
    };
    graph
        .nodes()
        .filter(|n| n.kind == NodeKind::Scalar)
        .find(|n| lies_beneath(&n.path, &prefix))
        .map(|n| MatchResult::found(&n.id, MatchStrategy::ValuePrefix))
        .unwrap_or_default()
}

pub(crate) fn strip_root_marker(query: &str) -> &str {
    query
        .strip_prefix("$.")
        .or_else(|| query.strip_prefix('$'))
        .unwrap_or(query)
}

// A query read as a path after dropping one leading `.`. Unparsable queries
// and the root yield `None`.
fn query_path(query: &str) -> Option<JsonPath> {
    let query = query.strip_prefix('.').unwrap_or(query);
    let path: JsonPath = query.parse().ok()?;
    (!path.is_root()).then_some(path)
}

// A dotted all-digit key in the query also names the array index it spells.
// Bracketed indices in the query only ever match indices.
fn segment_matches(wanted: &Segment, actual: &Segment) -> bool {
    match (wanted, actual) {
        (Segment::Key(digits), Segment::Index(index)) => *digits == index.to_string(),
        _ => wanted == actual,
    }
}

fn segments_match(wanted: &[Segment], actual: &[Segment]) -> bool {
    wanted.len() == actual.len()
        && wanted
            .iter()
            .zip(actual)
            .all(|(w, a)| segment_matches(w, a))
}

// `path` is a strict descendant of `prefix`.
fn lies_beneath(path: &JsonPath, prefix: &JsonPath) -> bool {
    let depth = prefix.depth();
    path.depth() > depth && segments_match(prefix.segments(), &path.segments()[..depth])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GraphBuilder;
    use serde_json::json;

    fn graph(doc: serde_json::Value) -> Graph {
        GraphBuilder::default().build(&doc).unwrap()
    }

    fn matched(query: &str, graph: &Graph) -> Option<String> {
        resolve(query, graph).matched
    }

    #[test]
    fn test_user_example() {
        let g = graph(json!({"user": {"id": 1, "name": "John"}}));
        assert_eq!(matched("user.id", &g).as_deref(), Some("user.id"));
        assert_eq!(matched("$.user.name", &g).as_deref(), Some("user.name"));
        assert_eq!(matched("user.missing", &g), None);
    }

    #[test]
    fn test_root_marker_forms() {
        let g = graph(json!([{"a": 1}]));
        assert_eq!(matched("$[0].a", &g).as_deref(), Some("[0].a"));
        assert_eq!(matched("$.[0].a", &g).as_deref(), Some("[0].a"));
        assert_eq!(matched("[0]", &g).as_deref(), Some("[0]"));
    }

    #[test]
    fn test_exact_strategy_reported() {
        let g = graph(json!({"a": {"b": 1}}));
        let result = resolve("a.b", &g);
        assert_eq!(result.strategy, Some(MatchStrategy::Exact));
        assert!(result.had_match());
    }

    #[test]
    fn test_leading_dot_is_loose() {
        let g = graph(json!({"user": {"id": 1}}));
        let result = resolve(".user.id", &g);
        assert_eq!(result.node_id(), Some("user.id"));
        assert_eq!(result.strategy, Some(MatchStrategy::Loose));
    }

    #[test]
    fn test_dotted_index_is_loose() {
        let g = graph(json!({"user": {"items": [{"name": "item1"}, {"name": "item2"}]}}));
        let result = resolve("user.items.1.name", &g);
        assert_eq!(result.node_id(), Some("user.items[1].name"));
        assert_eq!(result.strategy, Some(MatchStrategy::Loose));
    }

    #[test]
    fn test_numeric_key_prefers_exact() {
        let g = graph(json!({"a": {"0": "key"}, "b": ["index"]}));
        assert_eq!(matched("a.0", &g).as_deref(), Some("a.0"));
        assert_eq!(matched("b.0", &g).as_deref(), Some("b[0]"));
    }

    #[test]
    fn test_value_prefix_picks_first_scalar_beneath() {
        let g = graph(json!({"user": {"address": {"city": "New York", "country": "USA"}}}));
        // A trailing separator names no node, only the values beneath it.
        let result = resolve("user.address.", &g);
        assert_eq!(result.node_id(), Some("user.address.city"));
        assert_eq!(result.strategy, Some(MatchStrategy::ValuePrefix));

        let result = resolve("$.user.", &g);
        assert_eq!(result.node_id(), Some("user.address.city"));
    }

    #[test]
    fn test_value_prefix_skips_containers() {
        let g = graph(json!({"a": {"b": {}, "c": [], "d": [{"e": 5}]}}));
        assert_eq!(matched("a.", &g).as_deref(), Some("a.d[0].e"));
        assert_eq!(matched("a.b.", &g), None);
    }

    #[test]
    fn test_prefix_respects_segment_boundaries() {
        let g = graph(json!({"user": {"identifier": 7}}));
        assert_eq!(matched("user.id", &g), None);
    }

    #[test]
    fn test_case_sensitive() {
        let g = graph(json!({"User": {"Id": 1}}));
        assert_eq!(matched("user.id", &g), None);
        assert_eq!(matched("User.Id", &g).as_deref(), Some("User.Id"));
    }

    #[test]
    fn test_empty_queries_match_nothing() {
        let g = graph(json!({"a": 1}));
        for q in ["", "   ", "$", "$."] {
            assert_eq!(resolve(q, &g), MatchResult::no_match(), "{q:?}");
        }
    }

    #[test]
    fn test_empty_document_never_matches() {
        let g = graph(json!({}));
        for q in ["a", "$", "[0]", ".", "$.x.y"] {
            assert!(!resolve(q, &g).had_match(), "{q:?}");
        }
    }

    #[test]
    fn test_quoted_keys() {
        let g = graph(json!({"a.b": {"c d": true}}));
        assert_eq!(
            matched(r#"["a.b"]["c d"]"#, &g).as_deref(),
            Some(r#"["a.b"]["c d"]"#)
        );
        assert_eq!(matched("a.b", &g), None);
    }

    #[test]
    fn test_no_wildcards() {
        let g = graph(json!({"a": {"b": 1}}));
        assert_eq!(matched("a.*", &g), None);
        assert_eq!(matched("a.b|c", &g), None);
    }

    #[test]
    fn test_value_prefix_reaches_array_children() {
        let g = graph(json!({"user": {"items": [{"name": "item1"}], "tags": ["x"]}}));
        assert_eq!(matched("user.items.", &g).as_deref(), Some("user.items[0].name"));
        assert_eq!(matched("user.tags.", &g).as_deref(), Some("user.tags[0]"));
        assert_eq!(matched("user.tags[", &g).as_deref(), Some("user.tags[0]"));
        assert_eq!(matched("user.items.0.", &g).as_deref(), Some("user.items[0].name"));
    }

    #[test]
    fn test_value_prefix_reaches_quoted_keys() {
        let g = graph(json!({"user": {"a.b": 1}}));
        let result = resolve("user.", &g);
        assert_eq!(result.node_id(), Some(r#"user["a.b"]"#));
        assert_eq!(result.strategy, Some(MatchStrategy::ValuePrefix));
    }

    #[test]
    fn test_bracketed_index_never_matches_key() {
        let g = graph(json!({"a": {"0": 1}}));
        assert_eq!(matched("a[0]", &g), None);
        assert_eq!(matched("a.0", &g).as_deref(), Some("a.0"));
    }

    #[test]
    fn test_segment_matches() {
        let key = |k: &str| Segment::Key(k.to_string());
        assert!(segment_matches(&key("0"), &Segment::Index(0)));
        assert!(segment_matches(&key("12"), &Segment::Index(12)));
        assert!(!segment_matches(&key("01"), &Segment::Index(1)));
        assert!(!segment_matches(&Segment::Index(0), &key("0")));
        assert!(segment_matches(&key("a"), &key("a")));
    }
}
