//! Multi-selection of nodes and connections.
//!
//! Click replaces the selection, modifier-click toggles membership, and a drag
//! on empty canvas opens a box-select. Box coordinates are canvas space; the
//! editor converts pointer positions before calling in.

use std::collections::HashSet;

use crate::coords::{Point, Rect};
use crate::geometry::GeometryCache;
use crate::graph::{ConnectionId, Graph, NodeId};
use log::trace;

/// Something that can be clicked to select it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionTarget {
    Node(NodeId),
    Connection(ConnectionId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct BoxSelect {
    origin: Point,
    current: Point,
    additive: bool,
}

impl BoxSelect {
    fn rect(&self) -> Rect {
        Rect::from_corners(self.origin, self.current)
    }
}

#[derive(Debug, Clone)]
pub struct SelectionController {
    nodes: HashSet<NodeId>,
    connections: HashSet<ConnectionId>,
    pending_box: Option<BoxSelect>,
    box_threshold: f32,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(5.0)
    }
}

impl SelectionController {
    /// `box_threshold` is the size, in canvas units, below which a box-select
    /// in both dimensions counts as a click.
    pub fn new(box_threshold: f32) -> Self {
        Self {
            nodes: HashSet::new(),
            connections: HashSet::new(),
            pending_box: None,
            box_threshold,
        }
    }

    /// Handle a click on `target`. Returns whether the selection changed.
    pub fn click(&mut self, target: SelectionTarget, toggle: bool) -> bool {
        if toggle {
            match target {
                SelectionTarget::Node(id) => {
                    if !self.nodes.remove(&id) {
                        self.nodes.insert(id);
                    }
                }
                SelectionTarget::Connection(id) => {
                    if !self.connections.remove(&id) {
                        self.connections.insert(id);
                    }
                }
            }
            return true;
        }

        if self.len() == 1 && self.contains(target) {
            return false;
        }
        self.nodes.clear();
        self.connections.clear();
        match target {
            SelectionTarget::Node(id) => self.nodes.insert(id),
            SelectionTarget::Connection(id) => self.connections.insert(id),
        };
        true
    }

    pub fn clear(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        self.nodes.clear();
        self.connections.clear();
        true
    }

    /// Select every node and connection of `graph`.
    pub fn select_all(&mut self, graph: &Graph) -> bool {
        let nodes: HashSet<_> = graph.nodes().iter().map(|n| n.id).collect();
        let connections: HashSet<_> = graph.connections().iter().map(|c| c.id).collect();
        if nodes == self.nodes && connections == self.connections {
            return false;
        }
        self.nodes = nodes;
        self.connections = connections;
        true
    }

    /// Replace the node selection (and drop selected connections).
    pub fn replace_nodes<I>(&mut self, ids: I) -> bool
    where
        I: IntoIterator<Item = NodeId>,
    {
        let nodes: HashSet<_> = ids.into_iter().collect();
        if nodes == self.nodes && self.connections.is_empty() {
            return false;
        }
        self.nodes = nodes;
        self.connections.clear();
        true
    }

    /// Drop ids that no longer exist in `graph`. Returns whether anything was
    /// removed.
    pub fn prune(&mut self, graph: &Graph) -> bool {
        let before = self.len();
        self.nodes.retain(|id| graph.contains_node(*id));
        self.connections.retain(|id| graph.contains_connection(*id));
        before != self.len()
    }

    // === Box select ===

    pub fn begin_box(&mut self, origin: Point, additive: bool) {
        trace!("box select begin at ({}, {})", origin.x, origin.y);
        self.pending_box = Some(BoxSelect {
            origin,
            current: origin,
            additive,
        });
    }

    /// Move the free corner. Returns the normalized box, or `None` if no box
    /// is open.
    pub fn update_box(&mut self, current: Point) -> Option<Rect> {
        let pending = self.pending_box.as_mut()?;
        if current.is_finite() {
            pending.current = current;
        }
        Some(pending.rect())
    }

    pub fn box_rect(&self) -> Option<Rect> {
        self.pending_box.map(|b| b.rect())
    }

    pub fn is_box_selecting(&self) -> bool {
        self.pending_box.is_some()
    }

    /// Close the box and apply it. Returns `None` if no box was open,
    /// otherwise whether the selection changed.
    ///
    /// A box under the threshold in both dimensions acts as a click on empty
    /// canvas: a plain one clears the selection, an additive one keeps it.
    pub fn end_box(&mut self, current: Option<Point>, geometry: &GeometryCache) -> Option<bool> {
        if let Some(current) = current {
            self.update_box(current);
        }
        let pending = self.pending_box.take()?;
        let rect = pending.rect();

        if rect.width < self.box_threshold && rect.height < self.box_threshold {
            trace!("box select below threshold, treated as click");
            return Some(if pending.additive { false } else { self.clear() });
        }

        let hits = geometry.nodes_in_selection_box(rect);
        if pending.additive {
            let before = self.nodes.len();
            self.nodes.extend(hits);
            Some(self.nodes.len() != before)
        } else {
            Some(self.replace_nodes(hits))
        }
    }

    pub fn cancel_box(&mut self) -> bool {
        self.pending_box.take().is_some()
    }

    // === Queries ===

    pub fn contains(&self, target: SelectionTarget) -> bool {
        match target {
            SelectionTarget::Node(id) => self.nodes.contains(&id),
            SelectionTarget::Connection(id) => self.connections.contains(&id),
        }
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    pub fn contains_connection(&self, id: ConnectionId) -> bool {
        self.connections.contains(&id)
    }

    /// Selected node ids, sorted.
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<_> = self.nodes.iter().copied().collect();
        ids.sort();
        ids
    }

    /// Selected connection ids, sorted.
    pub fn selected_connections(&self) -> Vec<ConnectionId> {
        let mut ids: Vec<_> = self.connections.iter().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.nodes.len() + self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connections.is_empty()
    }
}

#[cfg(feature = "slint")]
mod model_sync {
    use super::SelectionController;
    use crate::graph::{Graph, NodeId};
    use slint::{Model, SharedString, VecModel};
    use uuid::Uuid;

    impl SelectionController {
        /// Mirror the node selection into a Slint model of id strings.
        pub fn sync_to_model(&self, model: &VecModel<SharedString>) {
            while model.row_count() > 0 {
                model.remove(0);
            }
            for id in self.selected_nodes() {
                model.push(SharedString::from(id.to_string()));
            }
        }

        /// Replace the node selection from a Slint model of id strings.
        /// Rows that are not valid ids, or name nodes missing from `graph`,
        /// are skipped. Returns whether the selection changed.
        pub fn sync_from_model(
            &mut self,
            model: &dyn Model<Data = SharedString>,
            graph: &Graph,
        ) -> bool {
            let ids = (0..model.row_count())
                .filter_map(|i| model.row_data(i))
                .filter_map(|s| Uuid::parse_str(s.as_str()).ok())
                .map(NodeId)
                .filter(|id| graph.contains_node(*id));
            self.replace_nodes(ids)
        }
    }
}
