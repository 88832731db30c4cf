//! Core data structures for the JSON graph

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PathParseError;

/// One step of a [`JsonPath`]: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Structural address of a value inside a JSON document.
///
/// Renders canonically in dot-and-bracket notation (`user.items[0].name`).
/// The root is the empty path and renders as the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct JsonPath(Vec<Segment>);

impl JsonPath {
    pub fn root() -> Self {
        JsonPath(Vec::new())
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        JsonPath(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments; the root has depth 0.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(segment);
        JsonPath(segments)
    }

    pub fn child_key(&self, key: impl Into<String>) -> Self {
        self.child(Segment::Key(key.into()))
    }

    pub fn child_index(&self, index: usize) -> Self {
        self.child(Segment::Index(index))
    }

    /// The enclosing path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(JsonPath(init.to_vec()))
    }
}

/// Whether a key must be written in the quoted `["..."]` form.
pub(crate) fn needs_quoting(key: &str) -> bool {
    key.is_empty()
        || key.starts_with('$')
        || key
            .chars()
            .any(|c| matches!(c, '.' | '[' | ']' | '"' | '\\') || c.is_whitespace())
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Key(key) if needs_quoting(key) => {
                    // Value's Display emits a JSON string literal with escapes.
                    write!(f, "[{}]", Value::String(key.clone()))?
                }
                Segment::Key(key) if position == 0 => f.write_str(key)?,
                Segment::Key(key) => write!(f, ".{key}")?,
            }
        }
        Ok(())
    }
}

impl FromStr for JsonPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PathParser { src: s, pos: 0 }.parse()
    }
}

struct PathParser<'a> {
    src: &'a str,
    pos: usize,
}

impl PathParser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error_at(&self, offset: usize, reason: &'static str) -> PathParseError {
        PathParseError { offset, reason }
    }

    fn parse(mut self) -> Result<JsonPath, PathParseError> {
        let mut segments = Vec::new();
        if self.src.is_empty() {
            return Ok(JsonPath::root());
        }
        if self.peek() != Some('[') {
            segments.push(self.bare_key()?);
        }
        while let Some(c) = self.bump() {
            match c {
                '.' => segments.push(self.bare_key()?),
                '[' => segments.push(self.bracketed()?),
                _ => {
                    return Err(self.error_at(self.pos - c.len_utf8(), "expected '.' or '['"));
                }
            }
        }
        Ok(JsonPath(segments))
    }

    fn bare_key(&mut self) -> Result<Segment, PathParseError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '.' || c == '[' {
                break;
            }
            if matches!(c, ']' | '"' | '\\') || c.is_whitespace() {
                return Err(self.error_at(self.pos, "reserved character in unquoted key"));
            }
            self.bump();
        }
        let key = &self.src[start..self.pos];
        if key.is_empty() {
            return Err(self.error_at(start, "empty key"));
        }
        if key.starts_with('$') {
            return Err(self.error_at(start, "unquoted key may not start with '$'"));
        }
        Ok(Segment::Key(key.to_string()))
    }

    // Called just after the opening '['.
    fn bracketed(&mut self) -> Result<Segment, PathParseError> {
        let start = self.pos;
        if self.peek() == Some('"') {
            self.bump();
            loop {
                match self.bump() {
                    None => return Err(self.error_at(start, "unterminated quoted key")),
                    Some('\\') => {
                        if self.bump().is_none() {
                            return Err(self.error_at(start, "unterminated quoted key"));
                        }
                    }
                    Some('"') => break,
                    Some(_) => {}
                }
            }
            let literal = &self.src[start..self.pos];
            let key: String = serde_json::from_str(literal)
                .map_err(|_| self.error_at(start, "invalid escape in quoted key"))?;
            self.expect_close()?;
            return Ok(Segment::Key(key));
        }

        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        let digits = &self.src[start..self.pos];
        if digits.is_empty() {
            return Err(self.error_at(start, "expected index or quoted key"));
        }
        let index = digits
            .parse::<usize>()
            .map_err(|_| self.error_at(start, "index out of range"))?;
        self.expect_close()?;
        Ok(Segment::Index(index))
    }

    fn expect_close(&mut self) -> Result<(), PathParseError> {
        match self.bump() {
            Some(']') => Ok(()),
            _ => Err(self.error_at(self.pos, "expected ']'")),
        }
    }
}

/// Discriminates what a node in the graph represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Object,
    Array,
    Scalar,
}

impl NodeKind {
    /// Kind of `value` at a given position; the document root is always `Root`.
    pub fn of(value: &Value, is_root: bool) -> Self {
        if is_root {
            return NodeKind::Root;
        }
        match value {
            Value::Object(_) => NodeKind::Object,
            Value::Array(_) => NodeKind::Array,
            _ => NodeKind::Scalar,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Object | NodeKind::Array)
    }
}

/// Top-left anchored drawing coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A single node in the JSON graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    /// Canonical path string; unique across the graph.
    pub id: String,
    pub path: JsonPath,
    pub label: String,
    pub kind: NodeKind,
    pub value: Value,
    pub depth: usize,
    pub position: Position,
    pub child_count: usize,
    /// Short rendering of scalar values.
    pub preview: Option<String>,
}

/// A parent → child edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl GraphEdge {
    pub fn between(source: &str, target: &str) -> Self {
        GraphEdge {
            id: format!("edge-{source}-{target}"),
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

/// Extent of the laid-out graph, for viewport fitting.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Full graph payload handed to the renderer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub bounds: Bounds,
}
