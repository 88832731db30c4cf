//! Error types for graph building, path parsing and configuration

use std::fmt;

use thiserror::Error;

/// A resource bound that a build exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Depth(usize),
    Nodes(usize),
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Depth(max) => write!(f, "maximum depth of {max}"),
            Limit::Nodes(max) => write!(f, "maximum of {max} nodes"),
        }
    }
}

/// Reasons a graph could not be built. A failed build never yields a partial graph.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid JSON at line {line}, column {column}: {message}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Cyclic structure: value at `{path}` is one of its own ancestors")]
    Cyclic { path: String },

    #[error("Graph too large: {limit} exceeded at `{path}`")]
    TooLarge { limit: Limit, path: String },
}

impl From<serde_json::Error> for BuildError {
    fn from(err: serde_json::Error) -> Self {
        let (line, column) = (err.line(), err.column());
        // serde_json appends the position to its own message.
        let text = err.to_string();
        let suffix = format!(" at line {line} column {column}");
        let message = text.strip_suffix(&suffix).unwrap_or(&text).to_string();
        BuildError::Parse {
            message,
            line,
            column,
        }
    }
}

/// A path string that is not in canonical dot/bracket form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid path at byte {offset}: {reason}")]
pub struct PathParseError {
    pub offset: usize,
    pub reason: &'static str,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
