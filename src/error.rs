use thiserror::Error;

use crate::editor::InteractionMode;
use crate::graph::{NodeId, ValidationError};

/// Invalid [`EditorConfig`](crate::EditorConfig) values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("scale bounds are inverted: min {min} > max {max}")]
    InvertedScaleBounds { min: f32, max: f32 },

    #[error("hit radius {hit} must not exceed snap radius {snap}")]
    HitRadiusExceedsSnap { hit: f32, snap: f32 },

    #[error("history depth must be at least 1")]
    ZeroHistoryDepth,

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Rejected graph store mutations.
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("node {0} already exists")]
    DuplicateNode(NodeId),

    #[error("node {0} has a non-finite position")]
    NonFinitePosition(NodeId),

    #[error("invalid connection: {0}")]
    InvalidConnection(ValidationError),
}

/// Umbrella error for the public editor API.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("snapshot serialization error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("graph is locked while {0:?} is in progress")]
    GestureActive(InteractionMode),
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
