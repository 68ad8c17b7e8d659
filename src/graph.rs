//! Graph store: nodes, connections, snapshots and connection validation.
//!
//! The [`Graph`] is the single shared mutable resource of an editor. Read
//! access is public; writes go through [`Graph::apply`], which is crate-private
//! so that every mutation passes the editor's commit path and lands in history.

use crate::coords::Point;
use crate::error::GraphError;
use crate::ports::{NodeType, PortId, PortRegistry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(
    /// Unique node identifier.
    NodeId
);
uuid_id!(
    /// Unique connection identifier.
    ConnectionId
);

/// A workflow step placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub position: Point,
    /// Step configuration. Opaque to the editor.
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub deactivated: bool,
}

impl Node {
    pub fn new(node_type: NodeType, position: Point) -> Self {
        Self::with_id(NodeId::new(), node_type, position)
    }

    pub fn with_id(id: NodeId, node_type: NodeType, position: Point) -> Self {
        Self {
            id,
            node_type,
            position,
            config: Value::Null,
            deactivated: false,
        }
    }
}

/// One endpoint of a connection: a port on a specific node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortRef {
    pub node: NodeId,
    pub port: PortId,
}

impl PortRef {
    pub fn new(node: NodeId, port: impl Into<PortId>) -> Self {
        Self {
            node,
            port: port.into(),
        }
    }
}

/// A directed edge from an outward port to a compatible port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub from_node: NodeId,
    pub from_port: PortId,
    pub to_node: NodeId,
    pub to_port: PortId,
}

impl Connection {
    /// Create a connection with a freshly generated id.
    pub fn new(from: PortRef, to: PortRef) -> Self {
        Self {
            id: ConnectionId::new(),
            from_node: from.node,
            from_port: from.port,
            to_node: to.node,
            to_port: to.port,
        }
    }

    pub fn from_ref(&self) -> PortRef {
        PortRef::new(self.from_node, self.from_port.clone())
    }

    pub fn to_ref(&self) -> PortRef {
        PortRef::new(self.to_node, self.to_port.clone())
    }

    /// True if both connections join the same (from, from_port, to, to_port) tuple.
    pub fn same_endpoints(&self, other: &Connection) -> bool {
        self.from_node == other.from_node
            && self.from_port == other.from_port
            && self.to_node == other.to_node
            && self.to_port == other.to_port
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.from_node == node || self.to_node == node
    }

    fn uses(&self, endpoint: &PortRef) -> bool {
        (self.from_node == endpoint.node && self.from_port == endpoint.port)
            || (self.to_node == endpoint.node && self.to_port == endpoint.port)
    }
}

/// Immutable copy of the graph contents. This is the history entry and the
/// shape external persistence reads and writes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
}

impl GraphSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A coarse-grained change to the graph. One mutation is one history entry.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphMutation {
    AddNode(Node),
    MoveNodes(Vec<(NodeId, Point)>),
    UpdateConfig { node: NodeId, config: Value },
    SetDeactivated { nodes: Vec<NodeId>, deactivated: bool },
    AddConnection(Connection),
    /// Remove nodes (cascading to incident connections) and connections.
    Delete {
        nodes: Vec<NodeId>,
        connections: Vec<ConnectionId>,
    },
}

/// What [`Graph::sanitize`] had to drop or repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SanitizeReport {
    pub dropped_nodes: usize,
    pub reset_positions: usize,
    pub dropped_connections: usize,
}

impl SanitizeReport {
    pub fn is_clean(&self) -> bool {
        *self == SanitizeReport::default()
    }
}

/// Node and connection collections, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: Vec<Node>,
    connections: Vec<Connection>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn contains_connection(&self, id: ConnectionId) -> bool {
        self.connection(id).is_some()
    }

    /// Ids of every connection touching `node`.
    pub fn incident_connections(&self, node: NodeId) -> Vec<ConnectionId> {
        self.connections
            .iter()
            .filter(|c| c.touches(node))
            .map(|c| c.id)
            .collect()
    }

    /// Whether a connection joining exactly these endpoints exists.
    pub fn connection_exists(&self, from: &PortRef, to: &PortRef) -> bool {
        self.connections.iter().any(|c| {
            c.from_node == from.node
                && c.from_port == from.port
                && c.to_node == to.node
                && c.to_port == to.port
        })
    }

    /// Number of connections attached to one node's port, either direction.
    pub fn port_connection_count(&self, endpoint: &PortRef) -> usize {
        self.connections.iter().filter(|c| c.uses(endpoint)).count()
    }

    /// Connection count of every port that has at least one connection,
    /// gathered in a single pass.
    pub fn port_connection_counts(&self) -> HashMap<PortRef, usize> {
        let mut counts = HashMap::new();
        for c in &self.connections {
            let from = PortRef::new(c.from_node, c.from_port.clone());
            let to = PortRef::new(c.to_node, c.to_port.clone());
            if from != to {
                *counts.entry(to).or_insert(0) += 1;
            }
            *counts.entry(from).or_insert(0) += 1;
        }
        counts
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            connections: self.connections.clone(),
        }
    }

    /// Replace contents with a snapshot taken from this store earlier.
    pub(crate) fn restore(&mut self, snapshot: GraphSnapshot) {
        self.nodes = snapshot.nodes;
        self.connections = snapshot.connections;
    }

    /// Build a graph from external data, filtering anything that violates the
    /// store invariants instead of failing.
    pub fn sanitize(snapshot: GraphSnapshot, registry: &PortRegistry) -> (Graph, SanitizeReport) {
        let mut report = SanitizeReport::default();
        let mut graph = Graph::new();
        let mut seen = HashSet::new();

        for mut node in snapshot.nodes {
            if !seen.insert(node.id) {
                report.dropped_nodes += 1;
                continue;
            }
            if !node.position.is_finite() {
                node.position = Point::ORIGIN;
                report.reset_positions += 1;
            }
            graph.nodes.push(node);
        }

        let validator = CompositeValidator::standard();
        let mut seen_connections = HashSet::new();
        for connection in snapshot.connections {
            let request = ConnectionRequest::new(connection.from_ref(), connection.to_ref());
            let valid = seen_connections.insert(connection.id)
                && validator.validate(&request, &graph, registry).is_valid();
            if valid {
                graph.connections.push(connection);
            } else {
                report.dropped_connections += 1;
            }
        }

        (graph, report)
    }

    /// Apply one mutation. Returns whether anything changed.
    ///
    /// Mutations are all-or-nothing: on error the graph is untouched.
    pub(crate) fn apply(
        &mut self,
        mutation: GraphMutation,
        registry: &PortRegistry,
    ) -> Result<bool, GraphError> {
        match mutation {
            GraphMutation::AddNode(node) => {
                if self.contains_node(node.id) {
                    return Err(GraphError::DuplicateNode(node.id));
                }
                if !node.position.is_finite() {
                    return Err(GraphError::NonFinitePosition(node.id));
                }
                self.nodes.push(node);
                Ok(true)
            }
            GraphMutation::MoveNodes(moves) => {
                for (id, position) in &moves {
                    if !self.contains_node(*id) {
                        return Err(GraphError::NodeNotFound(*id));
                    }
                    if !position.is_finite() {
                        return Err(GraphError::NonFinitePosition(*id));
                    }
                }
                let mut changed = false;
                for (id, position) in moves {
                    if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
                        if node.position != position {
                            node.position = position;
                            changed = true;
                        }
                    }
                }
                Ok(changed)
            }
            GraphMutation::UpdateConfig { node, config } => {
                let target = self
                    .nodes
                    .iter_mut()
                    .find(|n| n.id == node)
                    .ok_or(GraphError::NodeNotFound(node))?;
                if target.config == config {
                    return Ok(false);
                }
                target.config = config;
                Ok(true)
            }
            GraphMutation::SetDeactivated { nodes, deactivated } => {
                if let Some(missing) = nodes.iter().find(|id| !self.contains_node(**id)) {
                    return Err(GraphError::NodeNotFound(*missing));
                }
                let mut changed = false;
                for node in self.nodes.iter_mut().filter(|n| nodes.contains(&n.id)) {
                    if node.deactivated != deactivated {
                        node.deactivated = deactivated;
                        changed = true;
                    }
                }
                Ok(changed)
            }
            GraphMutation::AddConnection(connection) => {
                let request = ConnectionRequest::new(connection.from_ref(), connection.to_ref());
                if let ValidationResult::Invalid(err) =
                    CompositeValidator::standard().validate(&request, self, registry)
                {
                    return Err(GraphError::InvalidConnection(err));
                }
                self.connections.push(connection);
                Ok(true)
            }
            GraphMutation::Delete { nodes, connections } => {
                let before = (self.nodes.len(), self.connections.len());
                self.nodes.retain(|n| !nodes.contains(&n.id));
                self.connections.retain(|c| {
                    !connections.contains(&c.id)
                        && !nodes.contains(&c.from_node)
                        && !nodes.contains(&c.to_node)
                });
                Ok(before != (self.nodes.len(), self.connections.len()))
            }
        }
    }
}

// ============================================================================
// Connection Validation Framework
// ============================================================================

/// A proposed connection, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRequest {
    pub from: PortRef,
    pub to: PortRef,
}

impl ConnectionRequest {
    pub fn new(from: PortRef, to: PortRef) -> Self {
        Self { from, to }
    }

    pub fn into_connection(self) -> Connection {
        Connection::new(self.from, self.to)
    }
}

/// Result of connection validation with optional rejection reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Combine two results (AND logic): returns first error if any
    pub fn and(self, other: ValidationResult) -> ValidationResult {
        match self {
            ValidationResult::Valid => other,
            invalid => invalid,
        }
    }
}

/// Reasons a connection is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),
    #[error("node {node} has no port {port}")]
    PortNotFound { node: NodeId, port: PortId },
    #[error("cannot connect a node to itself")]
    SameNode,
    #[error("ports {from} and {to} are not compatible")]
    IncompatiblePorts { from: PortId, to: PortId },
    #[error("connection already exists")]
    DuplicateConnection,
    #[error("port {port} on node {node} accepts at most {max} connections")]
    MaxConnectionsReached {
        node: NodeId,
        port: PortId,
        max: usize,
    },
    #[error("{0}")]
    Custom(String),
}

/// A rule a proposed connection must satisfy.
///
/// Implement this to add application-specific rules (e.g. cycle prevention)
/// and compose them with [`CompositeValidator`].
pub trait ConnectionValidator {
    fn validate(
        &self,
        request: &ConnectionRequest,
        graph: &Graph,
        registry: &PortRegistry,
    ) -> ValidationResult;
}

/// Structural rules: both nodes exist and expose the named ports, the nodes
/// differ, and the port kinds are compatible.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicConnectionValidator;

impl ConnectionValidator for BasicConnectionValidator {
    fn validate(
        &self,
        request: &ConnectionRequest,
        graph: &Graph,
        registry: &PortRegistry,
    ) -> ValidationResult {
        let (from, to) = (&request.from, &request.to);
        for endpoint in [from, to] {
            let node = match graph.node(endpoint.node) {
                Some(n) => n,
                None => return ValidationResult::Invalid(ValidationError::NodeNotFound(endpoint.node)),
            };
            if !registry.node_has_port(&node.node_type, &endpoint.port) {
                return ValidationResult::Invalid(ValidationError::PortNotFound {
                    node: endpoint.node,
                    port: endpoint.port.clone(),
                });
            }
        }
        if from.node == to.node {
            return ValidationResult::Invalid(ValidationError::SameNode);
        }
        if !registry.is_valid_connection(&from.port, &to.port) {
            return ValidationResult::Invalid(ValidationError::IncompatiblePorts {
                from: from.port.clone(),
                to: to.port.clone(),
            });
        }
        ValidationResult::Valid
    }
}

/// Rejects a request whose (from, from_port, to, to_port) tuple already exists.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDuplicatesValidator;

impl ConnectionValidator for NoDuplicatesValidator {
    fn validate(
        &self,
        request: &ConnectionRequest,
        graph: &Graph,
        _registry: &PortRegistry,
    ) -> ValidationResult {
        if graph.connection_exists(&request.from, &request.to) {
            ValidationResult::Invalid(ValidationError::DuplicateConnection)
        } else {
            ValidationResult::Valid
        }
    }
}

/// Rejects a request that would exceed either port's `max_connections`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CapacityValidator;

impl ConnectionValidator for CapacityValidator {
    fn validate(
        &self,
        request: &ConnectionRequest,
        graph: &Graph,
        registry: &PortRegistry,
    ) -> ValidationResult {
        for endpoint in [&request.from, &request.to] {
            let count = graph.port_connection_count(endpoint);
            if !registry.can_accept_connection(&endpoint.port, count) {
                let max = registry
                    .get(&endpoint.port)
                    .and_then(|d| d.max_connections)
                    .unwrap_or(0);
                return ValidationResult::Invalid(ValidationError::MaxConnectionsReached {
                    node: endpoint.node,
                    port: endpoint.port.clone(),
                    max,
                });
            }
        }
        ValidationResult::Valid
    }
}

/// Runs validators in order; the first rejection wins.
pub struct CompositeValidator {
    validators: Vec<Box<dyn ConnectionValidator>>,
}

impl Default for CompositeValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeValidator {
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    /// Structure, duplicates, capacity.
    pub fn standard() -> Self {
        Self::new()
            .add(BasicConnectionValidator)
            .add(NoDuplicatesValidator)
            .add(CapacityValidator)
    }

    pub fn add<V: ConnectionValidator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }
}

impl ConnectionValidator for CompositeValidator {
    fn validate(
        &self,
        request: &ConnectionRequest,
        graph: &Graph,
        registry: &PortRegistry,
    ) -> ValidationResult {
        for v in &self.validators {
            let result = v.validate(request, graph, registry);
            if !result.is_valid() {
                return result;
            }
        }
        ValidationResult::Valid
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixture {
        graph: Graph,
        registry: PortRegistry,
        trigger: NodeId,
        agent: NodeId,
        memory: NodeId,
    }

    fn setup() -> Fixture {
        let registry = PortRegistry::default();
        let mut graph = Graph::new();
        let trigger = Node::new(NodeType::Trigger, Point::new(0.0, 0.0));
        let agent = Node::new(NodeType::AiAgent, Point::new(0.0, 200.0));
        let memory = Node::new(NodeType::MemoryStore, Point::new(0.0, 400.0));
        let ids = (trigger.id, agent.id, memory.id);
        for node in [trigger, agent, memory] {
            graph.apply(GraphMutation::AddNode(node), &registry).unwrap();
        }
        Fixture {
            graph,
            registry,
            trigger: ids.0,
            agent: ids.1,
            memory: ids.2,
        }
    }

    impl Fixture {
        fn connect(&mut self, from: (NodeId, &str), to: (NodeId, &str)) -> Result<bool, GraphError> {
            let c = Connection::new(PortRef::new(from.0, from.1), PortRef::new(to.0, to.1));
            self.graph.apply(GraphMutation::AddConnection(c), &self.registry)
        }
    }

    // ========================================================================
    // Node mutations
    // ========================================================================

    #[test]
    fn test_add_node_rejects_duplicate_id() {
        let mut f = setup();
        let dup = Node::with_id(f.trigger, NodeType::Code, Point::ORIGIN);
        let err = f.graph.apply(GraphMutation::AddNode(dup), &f.registry).unwrap_err();
        assert_eq!(err, GraphError::DuplicateNode(f.trigger));
        assert_eq!(f.graph.nodes().len(), 3);
    }

    #[test]
    fn test_add_node_rejects_non_finite_position() {
        let mut f = setup();
        let node = Node::new(NodeType::Code, Point::new(f32::NAN, 0.0));
        assert!(f.graph.apply(GraphMutation::AddNode(node), &f.registry).is_err());
    }

    #[test]
    fn test_move_nodes_is_all_or_nothing() {
        let mut f = setup();
        let missing = NodeId::new();
        let result = f.graph.apply(
            GraphMutation::MoveNodes(vec![(f.trigger, Point::new(40.0, 40.0)), (missing, Point::ORIGIN)]),
            &f.registry,
        );
        assert_eq!(result, Err(GraphError::NodeNotFound(missing)));
        assert_eq!(f.graph.node(f.trigger).unwrap().position, Point::ORIGIN);
    }

    #[test]
    fn test_move_to_same_position_reports_no_change() {
        let mut f = setup();
        let changed = f
            .graph
            .apply(GraphMutation::MoveNodes(vec![(f.trigger, Point::ORIGIN)]), &f.registry)
            .unwrap();
        assert!(!changed);
    }

    #[test]
    fn test_update_config() {
        let mut f = setup();
        let config = json!({ "model": "small", "temperature": 0.2 });
        let changed = f
            .graph
            .apply(GraphMutation::UpdateConfig { node: f.agent, config: config.clone() }, &f.registry)
            .unwrap();
        assert!(changed);
        assert_eq!(f.graph.node(f.agent).unwrap().config, config);
    }

    #[test]
    fn test_set_deactivated() {
        let mut f = setup();
        let changed = f
            .graph
            .apply(
                GraphMutation::SetDeactivated { nodes: vec![f.agent], deactivated: true },
                &f.registry,
            )
            .unwrap();
        assert!(changed);
        assert!(f.graph.node(f.agent).unwrap().deactivated);
        assert!(!f.graph.node(f.trigger).unwrap().deactivated);
    }

    // ========================================================================
    // Connections
    // ========================================================================

    #[test]
    fn test_add_valid_connection() {
        let mut f = setup();
        assert_eq!(f.connect((f.trigger, "output"), (f.agent, "input")), Ok(true));
        let c = &f.graph.connections()[0];
        assert_eq!(c.from_node, f.trigger);
        assert_eq!(c.to_node, f.agent);
        assert_eq!(c.from_port, PortId::from("output"));
        assert_eq!(c.to_port, PortId::from("input"));
    }

    #[test]
    fn test_duplicate_connection_rejected() {
        let mut f = setup();
        f.connect((f.trigger, "output"), (f.agent, "input")).unwrap();
        let err = f.connect((f.trigger, "output"), (f.agent, "input")).unwrap_err();
        assert_eq!(err, GraphError::InvalidConnection(ValidationError::DuplicateConnection));
        assert_eq!(f.graph.connections().len(), 1);
    }

    #[test]
    fn test_port_not_on_node_type_rejected() {
        let mut f = setup();
        let err = f.connect((f.trigger, "tool"), (f.agent, "input")).unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidConnection(ValidationError::PortNotFound { .. })
        ));
    }

    #[test]
    fn test_memory_capacity_enforced() {
        let mut f = setup();
        f.connect((f.memory, "output"), (f.agent, "memory")).unwrap();

        let second = Node::new(NodeType::MemoryStore, Point::new(300.0, 400.0));
        let second_id = second.id;
        f.graph.apply(GraphMutation::AddNode(second), &f.registry).unwrap();

        let err = f.connect((second_id, "output"), (f.agent, "memory")).unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidConnection(ValidationError::MaxConnectionsReached { max: 1, .. })
        ));
    }

    #[test]
    fn test_port_connection_counts_match_per_port_count() {
        let mut f = setup();
        f.connect((f.trigger, "output"), (f.agent, "input")).unwrap();
        f.connect((f.memory, "output"), (f.agent, "memory")).unwrap();

        let counts = f.graph.port_connection_counts();
        assert_eq!(counts.len(), 4);
        for port in [
            PortRef::new(f.trigger, "output"),
            PortRef::new(f.agent, "input"),
            PortRef::new(f.agent, "memory"),
            PortRef::new(f.memory, "output"),
            PortRef::new(f.agent, "tool"),
        ] {
            let expected = f.graph.port_connection_count(&port);
            assert_eq!(counts.get(&port).copied().unwrap_or(0), expected);
        }
    }

    #[test]
    fn test_self_connection_rejected() {
        let mut f = setup();
        let err = f.connect((f.agent, "tool"), (f.agent, "input")).unwrap_err();
        assert_eq!(err, GraphError::InvalidConnection(ValidationError::SameNode));
    }

    // ========================================================================
    // Delete cascade
    // ========================================================================

    #[test]
    fn test_delete_node_cascades_to_incident_connections() {
        let mut f = setup();
        f.connect((f.trigger, "output"), (f.agent, "input")).unwrap();
        f.connect((f.memory, "output"), (f.agent, "memory")).unwrap();
        assert_eq!(f.graph.incident_connections(f.agent).len(), 2);

        let changed = f
            .graph
            .apply(GraphMutation::Delete { nodes: vec![f.agent], connections: vec![] }, &f.registry)
            .unwrap();

        assert!(changed);
        assert!(!f.graph.contains_node(f.agent));
        assert!(f.graph.connections().is_empty());
        assert_eq!(f.graph.nodes().len(), 2);
    }

    #[test]
    fn test_delete_nothing_reports_no_change() {
        let mut f = setup();
        let changed = f
            .graph
            .apply(
                GraphMutation::Delete { nodes: vec![NodeId::new()], connections: vec![ConnectionId::new()] },
                &f.registry,
            )
            .unwrap();
        assert!(!changed);
    }

    // ========================================================================
    // Snapshots & sanitizing
    // ========================================================================

    #[test]
    fn test_snapshot_restore() {
        let mut f = setup();
        let before = f.graph.snapshot();
        f.connect((f.trigger, "output"), (f.agent, "input")).unwrap();
        f.graph.restore(before.clone());
        assert_eq!(f.graph.snapshot(), before);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut f = setup();
        f.connect((f.trigger, "output"), (f.agent, "input")).unwrap();
        let json = f.graph.snapshot().to_json().unwrap();
        assert!(json.contains("\"type\":\"ai-agent\""));
        assert!(json.contains("\"from_port\":\"output\""));
        let back = GraphSnapshot::from_json(&json).unwrap();
        assert_eq!(back, f.graph.snapshot());
    }

    #[test]
    fn test_sanitize_filters_bad_external_data() {
        let f = setup();
        let mut snapshot = f.graph.snapshot();
        snapshot.nodes.push(snapshot.nodes[0].clone());
        snapshot.nodes[1].position = Point::new(f32::INFINITY, 3.0);
        let ghost = NodeId::new();
        snapshot.connections.push(Connection::new(
            PortRef::new(f.trigger, "output"),
            PortRef::new(ghost, "input"),
        ));
        snapshot.connections.push(Connection::new(
            PortRef::new(f.trigger, "output"),
            PortRef::new(f.agent, "input"),
        ));
        snapshot.connections.push(Connection::new(
            PortRef::new(f.trigger, "output"),
            PortRef::new(f.agent, "input"),
        ));

        let (graph, report) = Graph::sanitize(snapshot, &f.registry);

        assert_eq!(report.dropped_nodes, 1);
        assert_eq!(report.reset_positions, 1);
        assert_eq!(report.dropped_connections, 2);
        assert!(!report.is_clean());
        assert_eq!(graph.nodes().len(), 3);
        assert_eq!(graph.connections().len(), 1);
        assert_eq!(graph.node(f.agent).unwrap().position, Point::ORIGIN);
    }

    // ========================================================================
    // Validators
    // ========================================================================

    struct RejectAll;

    impl ConnectionValidator for RejectAll {
        fn validate(&self, _: &ConnectionRequest, _: &Graph, _: &PortRegistry) -> ValidationResult {
            ValidationResult::Invalid(ValidationError::Custom("read-only".into()))
        }
    }

    #[test]
    fn test_composite_short_circuits_on_first_error() {
        let f = setup();
        let validator = CompositeValidator::standard().add(RejectAll);
        let bad = ConnectionRequest::new(PortRef::new(f.trigger, "output"), PortRef::new(f.trigger, "output"));
        let good = ConnectionRequest::new(PortRef::new(f.trigger, "output"), PortRef::new(f.agent, "input"));

        assert_eq!(
            validator.validate(&bad, &f.graph, &f.registry),
            ValidationResult::Invalid(ValidationError::SameNode)
        );
        assert_eq!(
            validator.validate(&good, &f.graph, &f.registry),
            ValidationResult::Invalid(ValidationError::Custom("read-only".into()))
        );
    }

    #[test]
    fn test_validation_result_and() {
        let invalid = ValidationResult::Invalid(ValidationError::SameNode);
        assert!(ValidationResult::Valid.and(ValidationResult::Valid).is_valid());
        assert_eq!(ValidationResult::Valid.and(invalid.clone()), invalid);
        assert_eq!(invalid.clone().and(ValidationResult::Valid), invalid);
    }
}
