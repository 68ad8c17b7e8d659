//! Node types, port definitions and the port compatibility table.
//!
//! The [`PortRegistry`] is immutable configuration. It is built once (usually
//! with [`PortRegistry::default`]) and handed to the editor as an
//! `Rc<PortRegistry>`; nothing in this crate keeps registry state in statics.
//!
//! Compatibility is declared per port definition as a set of port kinds, and
//! may be declared from either side: `output` listing `input` is enough for
//! both `output → input` and `input → output` to validate. The kinds and
//! their declarations form a small undirected graph.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Kind of a port. `Output` and `Tool` are "outward" kinds: connection
/// drawing may only start from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortKind {
    Input,
    Output,
    Tool,
    Memory,
}

impl PortKind {
    pub fn is_outward(self) -> bool {
        matches!(self, PortKind::Output | PortKind::Tool)
    }
}

/// Identifier of a port definition, e.g. `"input"` or `"true"`.
///
/// Port ids are shared by every node exposing the port; a connection endpoint
/// is the pair (node id, port id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(String);

impl PortId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PortId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static description of one port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDefinition {
    pub id: PortId,
    pub kind: PortKind,
    /// Kinds this port may be connected to.
    pub compatible: Vec<PortKind>,
    /// Maximum number of connections on one node's instance of this port.
    /// `None` is unbounded.
    pub max_connections: Option<usize>,
}

impl PortDefinition {
    pub fn new(id: &str, kind: PortKind, compatible: &[PortKind]) -> Self {
        Self {
            id: PortId::from(id),
            kind,
            compatible: compatible.to_vec(),
            max_connections: None,
        }
    }

    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = Some(max);
        self
    }
}

/// The closed set of node types the editor knows about.
///
/// Types that arrive from newer data and are not known here are kept as
/// [`NodeType::Unknown`] with their original tag, and get a symmetric
/// default port set (one input, one output).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Trigger,
    AiAgent,
    Llm,
    HttpRequest,
    Code,
    Transform,
    Condition,
    MemoryStore,
    Respond,
    Unknown(String),
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Trigger => "trigger",
            NodeType::AiAgent => "ai-agent",
            NodeType::Llm => "llm",
            NodeType::HttpRequest => "http-request",
            NodeType::Code => "code",
            NodeType::Transform => "transform",
            NodeType::Condition => "condition",
            NodeType::MemoryStore => "memory-store",
            NodeType::Respond => "respond",
            NodeType::Unknown(tag) => tag,
        }
    }

    /// Port ids exposed by nodes of this type, in display order.
    pub fn port_ids(&self) -> &'static [&'static str] {
        match self {
            NodeType::Trigger => &["output"],
            NodeType::AiAgent => &["input", "output", "tool", "memory"],
            NodeType::Llm | NodeType::HttpRequest | NodeType::Code | NodeType::Transform => {
                &["input", "output"]
            }
            NodeType::Condition => &["input", "true", "false"],
            NodeType::MemoryStore => &["output"],
            NodeType::Respond => &["input"],
            NodeType::Unknown(_) => &["input", "output"],
        }
    }
}

impl From<&str> for NodeType {
    fn from(tag: &str) -> Self {
        match tag {
            "trigger" => NodeType::Trigger,
            "ai-agent" => NodeType::AiAgent,
            "llm" => NodeType::Llm,
            "http-request" => NodeType::HttpRequest,
            "code" => NodeType::Code,
            "transform" => NodeType::Transform,
            "condition" => NodeType::Condition,
            "memory-store" => NodeType::MemoryStore,
            "respond" => NodeType::Respond,
            other => NodeType::Unknown(other.to_owned()),
        }
    }
}

impl From<String> for NodeType {
    fn from(tag: String) -> Self {
        NodeType::from(tag.as_str())
    }
}

impl From<NodeType> for String {
    fn from(ty: NodeType) -> Self {
        ty.as_str().to_owned()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable table of port definitions.
#[derive(Debug, Clone)]
pub struct PortRegistry {
    ports: HashMap<PortId, PortDefinition>,
}

impl Default for PortRegistry {
    /// The standard workflow table:
    ///
    /// | port     | kind   | compatible with | max |
    /// |----------|--------|-----------------|-----|
    /// | `input`  | input  | output          | -   |
    /// | `output` | output | input, memory   | -   |
    /// | `true`   | output | input           | -   |
    /// | `false`  | output | input           | -   |
    /// | `tool`   | tool   | input           | -   |
    /// | `memory` | memory | output          | 1   |
    fn default() -> Self {
        use PortKind::*;
        Self::new([
            PortDefinition::new("input", Input, &[Output]),
            PortDefinition::new("output", Output, &[Input, Memory]),
            PortDefinition::new("true", Output, &[Input]),
            PortDefinition::new("false", Output, &[Input]),
            PortDefinition::new("tool", Tool, &[Input]),
            PortDefinition::new("memory", Memory, &[Output]).with_max_connections(1),
        ])
    }
}

impl PortRegistry {
    /// Build a registry from definitions. Later duplicates replace earlier ones.
    pub fn new<I>(definitions: I) -> Self
    where
        I: IntoIterator<Item = PortDefinition>,
    {
        Self {
            ports: definitions.into_iter().map(|d| (d.id.clone(), d)).collect(),
        }
    }

    pub fn get(&self, port_id: &PortId) -> Option<&PortDefinition> {
        self.ports.get(port_id)
    }

    pub fn kind_of(&self, port_id: &PortId) -> Option<PortKind> {
        self.get(port_id).map(|d| d.kind)
    }

    /// Port definitions applicable to `node_type`, in display order.
    ///
    /// Port ids a node type names but the registry does not define are skipped.
    pub fn ports_for_node_type(&self, node_type: &NodeType) -> Vec<&PortDefinition> {
        node_type
            .port_ids()
            .iter()
            .filter_map(|id| self.ports.get(&PortId::from(*id)))
            .collect()
    }

    /// Whether `node_type` exposes a port with this id.
    pub fn node_has_port(&self, node_type: &NodeType, port_id: &PortId) -> bool {
        node_type.port_ids().contains(&port_id.as_str()) && self.ports.contains_key(port_id)
    }

    /// True iff the two ports' kinds are declared compatible from either side.
    pub fn is_valid_connection(&self, from: &PortId, to: &PortId) -> bool {
        match (self.get(from), self.get(to)) {
            (Some(a), Some(b)) => a.compatible.contains(&b.kind) || b.compatible.contains(&a.kind),
            _ => false,
        }
    }

    /// False once `current_count` reaches the port's maximum. Unknown ports
    /// accept nothing.
    pub fn can_accept_connection(&self, port_id: &PortId, current_count: usize) -> bool {
        match self.get(port_id) {
            Some(def) => def.max_connections.map_or(true, |max| current_count < max),
            None => false,
        }
    }
}
