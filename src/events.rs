//! Render-facing notifications.
//!
//! [`NodeEditor`](crate::NodeEditor) calls these as gestures progress and
//! mutations commit. Every method has an empty default so hosts implement only
//! what they draw.

use crate::connect::ConnectionPreview;
use crate::coords::{Point, Rect, Transform};
use crate::graph::{Connection, ConnectionId, Graph, GraphSnapshot, NodeId, ValidationError};
use crate::history::HistoryState;

#[allow(unused_variables)]
pub trait EditorListener {
    fn drag_started(&mut self, node: NodeId, position: Point) {}

    /// Called on every pointer move of a drag with the (snapped) position.
    fn node_dragged(&mut self, node: NodeId, position: Point) {}

    /// Final position of a drag. After a cancel this is the start position.
    fn drag_ended(&mut self, node: NodeId, position: Point) {}

    fn connection_preview(&mut self, preview: &ConnectionPreview) {}

    fn connection_created(&mut self, connection: &Connection) {}

    /// A draw finished without creating anything. `reason` is set when a
    /// target was found but rejected.
    fn connection_cancelled(&mut self, reason: Option<&ValidationError>) {}

    /// Box-select rectangle in canvas space, `None` once it closes.
    fn box_select_changed(&mut self, rect: Option<Rect>) {}

    fn selection_changed(&mut self, nodes: &[NodeId], connections: &[ConnectionId]) {}

    fn history_changed(&mut self, state: HistoryState) {}

    fn graph_changed(&mut self, graph: &Graph) {}

    fn transform_changed(&mut self, transform: &Transform) {}

    fn save_requested(&mut self, snapshot: &GraphSnapshot) {}
}

/// Listener that ignores everything.
impl EditorListener for () {}
