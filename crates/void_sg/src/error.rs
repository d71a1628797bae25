//! Error types for the scene graph

use std::path::PathBuf;
use thiserror::Error;

/// Result type for scene-graph operations
pub type Result<T> = std::result::Result<T, SceneGraphError>;

/// Errors that can occur while building, mutating or traversing a scene graph
#[derive(Debug, Error)]
pub enum SceneGraphError {
    /// Neither the registry nor the resolver knows this node type
    #[error("unknown scene graph node type '{type_name}' (symbol '{symbol}')")]
    UnknownNodeType {
        type_name: String,
        symbol: String,
    },

    /// Value assignment incompatible with the node's declared value type
    #[error("node '{node}' expects a {expected} value, got {found}")]
    TypeMismatch {
        node: String,
        expected: String,
        found: String,
    },

    /// The node kind cannot ingest values from this source format
    #[error("{type_name} node '{node}' cannot ingest {format} input")]
    UnsupportedFormat {
        node: String,
        type_name: String,
        format: String,
    },

    /// Internal contract broken; this is a defect, not a runtime condition
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Node names must be non-empty
    #[error("invalid node name '{0}'")]
    InvalidName(String),

    /// Attaching the child would make the graph cyclic
    #[error("adding '{child}' under '{parent}' would create a cycle")]
    Cycle {
        parent: String,
        child: String,
    },

    /// The source format is supported but its content is not a usable value
    #[error("invalid value for node '{node}': {message}")]
    InvalidValue {
        node: String,
        message: String,
    },

    /// Operation name that does not map onto a traversal operation
    #[error("unknown traversal operation '{0}'")]
    UnknownOperation(String),

    /// Failed to load a node library
    #[error("failed to load node library '{path}': {message}")]
    LibraryLoad {
        path: PathBuf,
        message: String,
    },

    /// Malformed scene description
    #[error("scene file error: {0}")]
    SceneFile(String),

    /// Malformed configuration
    #[error("config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SceneGraphError {
    /// Create an unknown node type error
    pub fn unknown_node_type(type_name: impl Into<String>, symbol: impl Into<String>) -> Self {
        SceneGraphError::UnknownNodeType {
            type_name: type_name.into(),
            symbol: symbol.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(
        node: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        SceneGraphError::TypeMismatch {
            node: node.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(
        node: impl Into<String>,
        type_name: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        SceneGraphError::UnsupportedFormat {
            node: node.into(),
            type_name: type_name.into(),
            format: format.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(node: impl Into<String>, message: impl Into<String>) -> Self {
        SceneGraphError::InvalidValue {
            node: node.into(),
            message: message.into(),
        }
    }

    /// Create a library load error
    pub fn library_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        SceneGraphError::LibraryLoad {
            path: path.into(),
            message: message.into(),
        }
    }
}
