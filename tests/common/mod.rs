//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use std::cell::RefCell;
use std::rc::Rc;

use workflow_node_editor::{
    Connection, ConnectionId, ConnectionPreview, EditorListener, Graph, GraphSnapshot, HistoryState,
    NodeId, Point, Rect, Transform, ValidationError,
};

/// Records listener notifications for assertions.
///
/// Clones share the same storage, so a test can keep one handle while the
/// editor owns another.
#[derive(Default, Clone)]
pub struct CallbackTracker {
    /// (node, position)
    pub drag_started: Rc<RefCell<Vec<(NodeId, Point)>>>,
    /// (node, position)
    pub node_dragged: Rc<RefCell<Vec<(NodeId, Point)>>>,
    /// (node, position)
    pub drag_ended: Rc<RefCell<Vec<(NodeId, Point)>>>,
    pub connection_preview: Rc<RefCell<Vec<ConnectionPreview>>>,
    pub connection_created: Rc<RefCell<Vec<Connection>>>,
    /// One entry per cancelled draw, with the rejection reason if any.
    pub connection_cancelled: Rc<RefCell<Vec<Option<ValidationError>>>>,
    pub box_select: Rc<RefCell<Vec<Option<Rect>>>>,
    /// Latest (nodes, connections) selection and the number of changes.
    pub selection: Rc<RefCell<(Vec<NodeId>, Vec<ConnectionId>)>>,
    pub selection_changed: Rc<RefCell<usize>>,
    pub history: Rc<RefCell<Vec<HistoryState>>>,
    /// Count of graph_changed calls
    pub graph_changed: Rc<RefCell<usize>>,
    pub transform: Rc<RefCell<Vec<Transform>>>,
    pub saved: Rc<RefCell<Vec<GraphSnapshot>>>,
}

impl CallbackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all recorded callbacks.
    pub fn clear(&self) {
        self.drag_started.borrow_mut().clear();
        self.node_dragged.borrow_mut().clear();
        self.drag_ended.borrow_mut().clear();
        self.connection_preview.borrow_mut().clear();
        self.connection_created.borrow_mut().clear();
        self.connection_cancelled.borrow_mut().clear();
        self.box_select.borrow_mut().clear();
        *self.selection_changed.borrow_mut() = 0;
        self.history.borrow_mut().clear();
        *self.graph_changed.borrow_mut() = 0;
        self.transform.borrow_mut().clear();
        self.saved.borrow_mut().clear();
    }

    pub fn last_history(&self) -> Option<HistoryState> {
        self.history.borrow().last().copied()
    }
}

impl EditorListener for CallbackTracker {
    fn drag_started(&mut self, node: NodeId, position: Point) {
        self.drag_started.borrow_mut().push((node, position));
    }

    fn node_dragged(&mut self, node: NodeId, position: Point) {
        self.node_dragged.borrow_mut().push((node, position));
    }

    fn drag_ended(&mut self, node: NodeId, position: Point) {
        self.drag_ended.borrow_mut().push((node, position));
    }

    fn connection_preview(&mut self, preview: &ConnectionPreview) {
        self.connection_preview.borrow_mut().push(preview.clone());
    }

    fn connection_created(&mut self, connection: &Connection) {
        self.connection_created.borrow_mut().push(connection.clone());
    }

    fn connection_cancelled(&mut self, reason: Option<&ValidationError>) {
        self.connection_cancelled.borrow_mut().push(reason.cloned());
    }

    fn box_select_changed(&mut self, rect: Option<Rect>) {
        self.box_select.borrow_mut().push(rect);
    }

    fn selection_changed(&mut self, nodes: &[NodeId], connections: &[ConnectionId]) {
        *self.selection.borrow_mut() = (nodes.to_vec(), connections.to_vec());
        *self.selection_changed.borrow_mut() += 1;
    }

    fn history_changed(&mut self, state: HistoryState) {
        self.history.borrow_mut().push(state);
    }

    fn graph_changed(&mut self, _graph: &Graph) {
        *self.graph_changed.borrow_mut() += 1;
    }

    fn transform_changed(&mut self, transform: &Transform) {
        self.transform.borrow_mut().push(*transform);
    }

    fn save_requested(&mut self, snapshot: &GraphSnapshot) {
        self.saved.borrow_mut().push(snapshot.clone());
    }
}
