//! Text exports of the source document and its graph

use serde_json::Value;

use crate::graph::Graph;

/// Two-space pretty JSON with member order preserved.
pub fn to_canonical_text(value: &Value) -> String {
    // Serializing a `Value` to a String cannot fail.
    serde_json::to_string_pretty(value).unwrap_or_default()
}

pub fn to_compact_text(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Every node path in walk order, one per line. The root is written as `$`.
pub fn export_path_list(graph: &Graph) -> String {
    let mut out = String::new();
    for node in graph.nodes() {
        if node.id.is_empty() {
            out.push('$');
        } else {
            out.push_str(&node.id);
        }
        out.push('\n');
    }
    out
}
