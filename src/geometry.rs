//! Node bounds and port anchor positions in canvas space.
//!
//! Nodes have a uniform size given by [`NodeMetrics`]. Ports sit on the node
//! edges by kind: inputs on the left, outputs on the right, tool and memory
//! ports along the bottom. Ports sharing an edge are spread evenly in the
//! order the node type lists them.
//!
//! [`GeometryCache`] stores the absolute anchor of every port of every node so
//! that repeated hit tests during one gesture do not recompute layout.

use crate::coords::{Point, Rect};
use crate::graph::{Graph, Node, NodeId, PortRef};
use crate::hit_test::{find_nearest_port, find_node_at, nodes_in_selection_box, NodeBounds, PortGeometry};
use crate::ports::{NodeType, PortId, PortKind, PortRegistry};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeMetrics {
    pub width: f32,
    pub height: f32,
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self {
            width: 180.0,
            height: 80.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Left,
    Right,
    Bottom,
}

impl From<PortKind> for Edge {
    fn from(kind: PortKind) -> Self {
        match kind {
            PortKind::Input => Edge::Left,
            PortKind::Output => Edge::Right,
            PortKind::Tool | PortKind::Memory => Edge::Bottom,
        }
    }
}

impl NodeMetrics {
    pub fn bounds(&self, node: &Node) -> Rect {
        Rect::new(node.position.x, node.position.y, self.width, self.height)
    }

    /// Offsets of every port of `node_type`, relative to the node's top-left.
    pub fn port_offsets(
        &self,
        node_type: &NodeType,
        registry: &PortRegistry,
    ) -> Vec<(PortId, PortKind, Point)> {
        let ports = registry.ports_for_node_type(node_type);
        let mut out = Vec::with_capacity(ports.len());

        for edge in [Edge::Left, Edge::Right, Edge::Bottom] {
            let on_edge: Vec<_> = ports.iter().filter(|p| Edge::from(p.kind) == edge).collect();
            let slots = on_edge.len() as f32 + 1.0;
            for (i, def) in on_edge.into_iter().enumerate() {
                let t = (i as f32 + 1.0) / slots;
                let offset = match edge {
                    Edge::Left => Point::new(0.0, self.height * t),
                    Edge::Right => Point::new(self.width, self.height * t),
                    Edge::Bottom => Point::new(self.width * t, self.height),
                };
                out.push((def.id.clone(), def.kind, offset));
            }
        }
        out
    }
}

/// Absolute position of one node's port.
#[derive(Debug, Clone, PartialEq)]
pub struct PortAnchor {
    pub node: NodeId,
    pub port: PortId,
    pub kind: PortKind,
    pub position: Point,
}

impl PortAnchor {
    pub fn port_ref(&self) -> PortRef {
        PortRef::new(self.node, self.port.clone())
    }
}

impl PortGeometry for &PortAnchor {
    fn position(&self) -> Point {
        self.position
    }
}

/// Snapshot of node bounds and port anchors for one graph state.
#[derive(Debug, Clone, Default)]
pub struct GeometryCache {
    bounds: Vec<NodeBounds>,
    anchors: Vec<PortAnchor>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(graph: &Graph, registry: &PortRegistry, metrics: &NodeMetrics) -> Self {
        let mut cache = Self::new();
        for node in graph.nodes() {
            cache.insert_node(node, registry, metrics);
        }
        cache
    }

    fn insert_node(&mut self, node: &Node, registry: &PortRegistry, metrics: &NodeMetrics) {
        self.bounds.push(NodeBounds {
            id: node.id,
            rect: metrics.bounds(node),
        });
        for (port, kind, offset) in metrics.port_offsets(&node.node_type, registry) {
            self.anchors.push(PortAnchor {
                node: node.id,
                port,
                kind,
                position: node.position + offset,
            });
        }
    }

    pub fn anchors(&self) -> &[PortAnchor] {
        &self.anchors
    }

    pub fn anchor(&self, endpoint: &PortRef) -> Option<&PortAnchor> {
        self.anchors
            .iter()
            .find(|a| a.node == endpoint.node && a.port == endpoint.port)
    }

    pub fn node_bounds(&self, id: NodeId) -> Option<Rect> {
        self.bounds.iter().find(|b| b.id == id).map(|b| b.rect)
    }

    /// Nearest port of any node within `radius` of `point`.
    pub fn find_port_at(&self, point: Point, radius: f32) -> Option<&PortAnchor> {
        find_nearest_port(point, self.anchors.iter(), radius)
    }

    pub fn find_node_at(&self, point: Point) -> Option<NodeId> {
        find_node_at(point, self.bounds.iter().copied())
    }

    pub fn nodes_in_selection_box(&self, selection: Rect) -> Vec<NodeId> {
        nodes_in_selection_box(selection, self.bounds.iter().copied())
    }
}
