//! Depth-first traversal assigning every reachable value its structural path

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, Limit};
use crate::model::{JsonPath, NodeKind, Segment};
use crate::source::{JsonSource, Shape};

/// Upper bounds on a single build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildLimits {
    pub max_depth: usize,
    pub max_nodes: usize,
}

impl Default for BuildLimits {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_nodes: 100_000,
        }
    }
}

/// One walked value.
#[derive(Debug)]
pub struct WalkEntry<S> {
    pub path: JsonPath,
    pub kind: NodeKind,
    pub depth: usize,
    /// Index of the parent entry.
    pub parent: Option<usize>,
    /// Indices of the child entries, in document order.
    pub children: Vec<usize>,
    pub source: S,
}

enum Frame<S> {
    Enter {
        source: S,
        path: JsonPath,
        parent: Option<usize>,
    },
    Exit(usize),
}

/// Walk `root` in pre-order, emitting one entry per reachable value.
///
/// Object members are visited in key-insertion order, array items in index
/// order. Fails on a container that is its own ancestor, or when `limits`
/// are exceeded.
pub fn walk<S: JsonSource>(root: S, limits: &BuildLimits) -> Result<Vec<WalkEntry<S>>, BuildError> {
    let mut entries: Vec<WalkEntry<S>> = Vec::new();
    // Identities of containers on the active path
    let mut on_path: HashSet<usize> = HashSet::new();
    let mut stack = vec![Frame::Enter {
        source: root,
        path: JsonPath::root(),
        parent: None,
    }];

    while let Some(frame) = stack.pop() {
        let (source, path, parent) = match frame {
            Frame::Exit(identity) => {
                on_path.remove(&identity);
                continue;
            }
            Frame::Enter {
                source,
                path,
                parent,
            } => (source, path, parent),
        };

        let depth = path.depth();
        if depth > limits.max_depth {
            return Err(BuildError::TooLarge {
                limit: Limit::Depth(limits.max_depth),
                path: path.to_string(),
            });
        }
        if entries.len() >= limits.max_nodes {
            return Err(BuildError::TooLarge {
                limit: Limit::Nodes(limits.max_nodes),
                path: path.to_string(),
            });
        }

        if let Some(identity) = source.identity() {
            if !on_path.insert(identity) {
                return Err(BuildError::Cyclic {
                    path: path.to_string(),
                });
            }
            stack.push(Frame::Exit(identity));
        }

        let index = entries.len();
        let (kind, children) = match source.shape() {
            Shape::Scalar => (NodeKind::Scalar, Vec::new()),
            Shape::Array(items) => (
                NodeKind::Array,
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, child)| (Segment::Index(i), child))
                    .collect(),
            ),
            Shape::Object(members) => (
                NodeKind::Object,
                members
                    .into_iter()
                    .map(|(key, child)| (Segment::Key(key), child))
                    .collect::<Vec<_>>(),
            ),
        };
        let kind = if parent.is_none() { NodeKind::Root } else { kind };

        // Reversed so the first child is popped first.
        for (segment, child) in children.into_iter().rev() {
            stack.push(Frame::Enter {
                source: child,
                path: path.child(segment),
                parent: Some(index),
            });
        }

        if let Some(p) = parent {
            entries[p].children.push(index);
        }
        entries.push(WalkEntry {
            path,
            kind,
            depth,
            parent,
            children: Vec::new(),
            source,
        });
    }

    Ok(entries)
}
