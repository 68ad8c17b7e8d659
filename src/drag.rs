//! Pointer-drag state machine that relocates a single node.
//!
//! ```text
//! Idle --start--> Dragging --end/cancel--> Idle
//! ```
//!
//! The controller never touches the graph. It reports positions; the editor
//! commits the final one as a single history entry.

use crate::coords::{screen_to_canvas, snap_point, Point, Transform};
use crate::graph::NodeId;
use log::{debug, trace};

/// State carried while a node is being dragged. All points are canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub node: NodeId,
    /// Pointer position relative to the node's top-left corner at grab time.
    pub offset: Point,
    pub start: Point,
    pub current: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Result of a finished drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOutcome {
    pub node: NodeId,
    pub start: Point,
    pub position: Point,
}

impl DragOutcome {
    pub fn moved(&self) -> bool {
        self.start != self.position
    }
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
    grid: Option<f32>,
}

impl DragController {
    /// `grid` is the snap spacing, or `None` to place nodes freely.
    pub fn new(grid: Option<f32>) -> Self {
        Self {
            state: DragState::Idle,
            grid: grid.filter(|g| g.is_finite() && *g > 0.0),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    /// Begin dragging `node`, grabbed at screen point `pointer`.
    ///
    /// Returns `false` (and changes nothing) if a drag is already running or
    /// the inputs are not finite.
    pub fn start(
        &mut self,
        pointer: Point,
        transform: &Transform,
        node: NodeId,
        node_start: Point,
    ) -> bool {
        if self.is_dragging() {
            trace!("drag start for {node} ignored: already dragging");
            return false;
        }
        let canvas = screen_to_canvas(pointer, transform);
        if !canvas.is_finite() || !node_start.is_finite() {
            trace!("drag start for {node} ignored: non-finite input");
            return false;
        }

        debug!("drag start: node {node} at ({}, {})", node_start.x, node_start.y);
        self.state = DragState::Dragging(DragSession {
            node,
            offset: canvas - node_start,
            start: node_start,
            current: node_start,
        });
        true
    }

    /// Follow the pointer. Returns the node and its new (snapped) position, or
    /// `None` when idle.
    pub fn move_to(&mut self, pointer: Point, transform: &Transform) -> Option<(NodeId, Point)> {
        let grid = self.grid;
        let DragState::Dragging(session) = &mut self.state else {
            trace!("drag move ignored: not dragging");
            return None;
        };

        let mut position = screen_to_canvas(pointer, transform) - session.offset;
        if let Some(grid) = grid {
            position = snap_point(position, grid);
        }
        if !position.is_finite() {
            trace!("drag move ignored: non-finite position");
            return None;
        }
        session.current = position;
        Some((session.node, position))
    }

    /// Finish the drag at the last position, or at `pointer` if given.
    pub fn end(&mut self, pointer: Option<Point>, transform: &Transform) -> Option<DragOutcome> {
        if let Some(pointer) = pointer {
            self.move_to(pointer, transform);
        }
        match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => {
                debug!(
                    "drag end: node {} at ({}, {})",
                    session.node, session.current.x, session.current.y
                );
                Some(DragOutcome {
                    node: session.node,
                    start: session.start,
                    position: session.current,
                })
            }
            DragState::Idle => {
                trace!("drag end ignored: not dragging");
                None
            }
        }
    }

    /// Abort the drag. The outcome carries the start position as the final
    /// one. Calling this while idle does nothing.
    pub fn cancel(&mut self) -> Option<DragOutcome> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => {
                debug!("drag cancelled: node {} back to start", session.node);
                Some(DragOutcome {
                    node: session.node,
                    start: session.start,
                    position: session.start,
                })
            }
            DragState::Idle => None,
        }
    }
}
