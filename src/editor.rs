//! The editor orchestrator.
//!
//! [`NodeEditor`] owns the graph and every controller. Pointer and keyboard
//! events enter here and are routed to exactly one active gesture, tracked by
//! [`InteractionMode`]. All graph writes go through one commit path that
//! snapshots the previous state into history, prunes the selection and
//! notifies the listener.

use std::rc::Rc;

use log::{debug, info, trace, warn};

use crate::config::{EditorConfig, GestureConflictPolicy};
use crate::connect::{ConnectionDrawController, ConnectionPreview, DrawOutcome};
use crate::coords::{screen_to_canvas, snap_point, Point, Rect, Transform};
use crate::drag::{DragController, DragOutcome};
use crate::error::{EditorError, GraphError, Result};
use crate::events::EditorListener;
use crate::geometry::GeometryCache;
use crate::graph::{
    CompositeValidator, ConnectionId, ConnectionValidator, Graph, GraphMutation, GraphSnapshot,
    Node, NodeId, PortRef, SanitizeReport,
};
use crate::history::{HistoryController, HistoryState};
use crate::ports::{NodeType, PortRegistry};
use crate::selection::{SelectionController, SelectionTarget};
use crate::shortcuts::{KeyChord, Modifiers, ShortcutIntent, ShortcutTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    DraggingNode,
    DrawingConnection,
    BoxSelecting,
    Panning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// What lies under a pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    Port(PortRef),
    Node(NodeId),
    Connection(ConnectionId),
    Canvas,
}

pub struct NodeEditor<L = ()> {
    config: EditorConfig,
    registry: Rc<PortRegistry>,
    validator: Box<dyn ConnectionValidator>,
    shortcuts: ShortcutTable,

    graph: Graph,
    geometry: GeometryCache,
    transform: Transform,
    viewport: Option<Point>,

    mode: InteractionMode,
    drag: DragController,
    draw: ConnectionDrawController,
    selection: SelectionController,
    history: HistoryController,
    pan_last: Option<Point>,

    listener: L,
}

impl<L: EditorListener> NodeEditor<L> {
    /// Create an empty editor with the default port table.
    pub fn new(config: EditorConfig, listener: L) -> Result<Self> {
        Self::with_registry(config, Rc::new(PortRegistry::default()), listener)
    }

    pub fn with_registry(
        config: EditorConfig,
        registry: Rc<PortRegistry>,
        listener: L,
    ) -> Result<Self> {
        config.validate()?;
        let grid = config.snap_to_grid.then_some(config.grid_size);
        Ok(Self {
            drag: DragController::new(grid),
            draw: ConnectionDrawController::new(config.snap_radius, config.hit_radius),
            selection: SelectionController::new(config.box_select_threshold),
            history: HistoryController::new(config.history_depth),
            validator: Box::new(CompositeValidator::standard()),
            shortcuts: ShortcutTable::default(),
            graph: Graph::new(),
            geometry: GeometryCache::new(),
            transform: Transform::IDENTITY,
            viewport: None,
            mode: InteractionMode::Idle,
            pan_last: None,
            registry,
            config,
            listener,
        })
    }

    /// Replace the connection validator used when a draw gesture ends.
    pub fn set_validator<V: ConnectionValidator + 'static>(&mut self, validator: V) {
        self.validator = Box::new(validator);
    }

    pub fn shortcuts_mut(&mut self) -> &mut ShortcutTable {
        &mut self.shortcuts
    }

    /// Size of the hosting view in screen units. Keyboard zoom anchors on its
    /// center; without it, on the screen origin.
    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.viewport = Some(Point::new(width, height));
    }

    // === Accessors ===

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registry(&self) -> &Rc<PortRegistry> {
        &self.registry
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn geometry(&self) -> &GeometryCache {
        &self.geometry
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn history_state(&self) -> HistoryState {
        self.history.state()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_len()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_len()
    }

    pub fn connection_preview(&self) -> Option<ConnectionPreview> {
        self.draw.preview()
    }

    /// Live position of the node being dragged.
    pub fn drag_position(&self) -> Option<(NodeId, Point)> {
        self.drag.session().map(|s| (s.node, s.current))
    }

    pub fn box_select_rect(&self) -> Option<Rect> {
        self.selection.box_rect()
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    // === Commit path ===

    fn commit(&mut self, mutation: GraphMutation) -> std::result::Result<bool, GraphError> {
        let before = self.graph.snapshot();
        let changed = self.graph.apply(mutation, &self.registry)?;
        if changed {
            self.history.commit(before);
            self.graph_replaced();
        }
        Ok(changed)
    }

    /// Refresh derived state after the graph contents changed.
    fn graph_replaced(&mut self) {
        self.geometry = GeometryCache::build(&self.graph, &self.registry, &self.config.node_metrics);
        let pruned = self.selection.prune(&self.graph);
        self.listener.graph_changed(&self.graph);
        if pruned {
            self.notify_selection();
        }
        self.listener.history_changed(self.history.state());
    }

    fn notify_selection(&mut self) {
        let nodes = self.selection.selected_nodes();
        let connections = self.selection.selected_connections();
        self.listener.selection_changed(&nodes, &connections);
    }

    // === Hit testing ===

    /// Find what lies under a screen point: ports first, then nodes.
    pub fn target_at(&self, screen: Point) -> HitTarget {
        let canvas = screen_to_canvas(screen, &self.transform);
        if let Some(anchor) = self.geometry.find_port_at(canvas, self.config.hit_radius) {
            return HitTarget::Port(anchor.port_ref());
        }
        match self.geometry.find_node_at(canvas) {
            Some(node) => HitTarget::Node(node),
            None => HitTarget::Canvas,
        }
    }

    // === Gesture arbitration ===

    /// Make room for a new gesture. Returns `false` if it must be refused.
    fn begin_gesture(&mut self, next: InteractionMode) -> bool {
        if self.mode == InteractionMode::Idle {
            return true;
        }
        match self.config.gesture_conflict {
            GestureConflictPolicy::Refuse => {
                trace!("{next:?} refused: {:?} in progress", self.mode);
                false
            }
            GestureConflictPolicy::Resolve => {
                debug!("{next:?} resolves pending {:?}", self.mode);
                self.finish_gesture(None, None);
                true
            }
        }
    }

    fn set_mode(&mut self, mode: InteractionMode) {
        if self.mode != mode {
            debug!("mode {:?} -> {mode:?}", self.mode);
            self.mode = mode;
        }
    }

    /// End the active gesture as a pointer release would.
    fn finish_gesture(&mut self, pointer: Option<Point>, explicit_target: Option<PortRef>) {
        match self.mode {
            InteractionMode::Idle => trace!("pointer release ignored: idle"),
            InteractionMode::DraggingNode => {
                let outcome = self.drag.end(pointer, &self.transform);
                self.finish_drag(outcome);
            }
            InteractionMode::DrawingConnection => {
                let outcome = self.draw.end(
                    pointer,
                    &self.transform,
                    explicit_target,
                    &self.graph,
                    &self.registry,
                    &self.geometry,
                    &*self.validator,
                );
                self.finish_draw(outcome);
            }
            InteractionMode::BoxSelecting => {
                let canvas = pointer.map(|p| screen_to_canvas(p, &self.transform));
                if self.selection.end_box(canvas, &self.geometry) == Some(true) {
                    self.notify_selection();
                }
                self.listener.box_select_changed(None);
            }
            InteractionMode::Panning => self.pan_last = None,
        }
        self.set_mode(InteractionMode::Idle);
    }

    /// Abort the active gesture without applying it.
    fn cancel_gesture(&mut self) {
        match self.mode {
            InteractionMode::Idle => trace!("cancel ignored: idle"),
            InteractionMode::DraggingNode => {
                if let Some(outcome) = self.drag.cancel() {
                    self.listener.drag_ended(outcome.node, outcome.position);
                }
            }
            InteractionMode::DrawingConnection => {
                if self.draw.cancel() {
                    self.listener.connection_cancelled(None);
                }
            }
            InteractionMode::BoxSelecting => {
                if self.selection.cancel_box() {
                    self.listener.box_select_changed(None);
                }
            }
            InteractionMode::Panning => self.pan_last = None,
        }
        self.set_mode(InteractionMode::Idle);
    }

    fn finish_drag(&mut self, outcome: Option<DragOutcome>) {
        let Some(outcome) = outcome else {
            return;
        };
        if outcome.moved() {
            let moves = vec![(outcome.node, outcome.position)];
            if let Err(err) = self.commit(GraphMutation::MoveNodes(moves)) {
                debug!("drag result discarded: {err}");
            }
        }
        self.listener.drag_ended(outcome.node, outcome.position);
    }

    fn finish_draw(&mut self, outcome: Option<DrawOutcome>) {
        match outcome {
            None => {}
            Some(DrawOutcome::Created(connection)) => {
                match self.commit(GraphMutation::AddConnection(connection.clone())) {
                    Ok(_) => self.listener.connection_created(&connection),
                    Err(GraphError::InvalidConnection(reason)) => {
                        debug!("connection refused by graph store: {reason}");
                        self.listener.connection_cancelled(Some(&reason));
                    }
                    Err(err) => {
                        debug!("connection refused by graph store: {err}");
                        self.listener.connection_cancelled(None);
                    }
                }
            }
            Some(DrawOutcome::Cancelled { reason }) => {
                self.listener.connection_cancelled(reason.as_ref());
            }
        }
    }

    // === Pointer input ===

    /// Pointer pressed at a screen point. Hit-tests and dispatches.
    pub fn pointer_down(&mut self, screen: Point, button: PointerButton, modifiers: Modifiers) {
        let target = self.target_at(screen);
        self.pointer_down_on(target, screen, button, modifiers);
    }

    /// Pointer pressed on a target the host already resolved.
    pub fn pointer_down_on(
        &mut self,
        target: HitTarget,
        screen: Point,
        button: PointerButton,
        modifiers: Modifiers,
    ) {
        if !screen.is_finite() {
            trace!("pointer down ignored: non-finite position");
            return;
        }
        match button {
            PointerButton::Secondary => trace!("secondary button ignored"),
            PointerButton::Middle => self.start_pan(screen),
            PointerButton::Primary => match target {
                HitTarget::Port(port) => {
                    let outward = self
                        .registry
                        .kind_of(&port.port)
                        .is_some_and(|k| k.is_outward());
                    if outward {
                        self.start_draw(port);
                    } else {
                        self.press_node(port.node, screen, modifiers);
                    }
                }
                HitTarget::Node(node) => self.press_node(node, screen, modifiers),
                HitTarget::Connection(id) => {
                    if !self.begin_gesture(InteractionMode::Idle) {
                        return;
                    }
                    if self.selection.click(SelectionTarget::Connection(id), modifiers.toggles_selection()) {
                        self.notify_selection();
                    }
                }
                HitTarget::Canvas => self.start_box(screen, modifiers),
            },
        }
    }

    fn press_node(&mut self, node: NodeId, screen: Point, modifiers: Modifiers) {
        let Some(position) = self.graph.node(node).map(|n| n.position) else {
            trace!("press on unknown node {node} ignored");
            return;
        };
        if !self.begin_gesture(InteractionMode::DraggingNode) {
            return;
        }
        let toggle = modifiers.toggles_selection();
        if self.selection.click(SelectionTarget::Node(node), toggle) {
            self.notify_selection();
        }
        if toggle {
            return;
        }
        if self.drag.start(screen, &self.transform, node, position) {
            self.set_mode(InteractionMode::DraggingNode);
            self.listener.drag_started(node, position);
        }
    }

    fn start_draw(&mut self, source: PortRef) {
        if !self.begin_gesture(InteractionMode::DrawingConnection) {
            return;
        }
        if let Some(preview) = self
            .draw
            .start(&source, &self.graph, &self.registry, &self.geometry)
        {
            self.set_mode(InteractionMode::DrawingConnection);
            self.listener.connection_preview(&preview);
        }
    }

    fn start_box(&mut self, screen: Point, modifiers: Modifiers) {
        if !self.begin_gesture(InteractionMode::BoxSelecting) {
            return;
        }
        let canvas = screen_to_canvas(screen, &self.transform);
        self.selection.begin_box(canvas, modifiers.toggles_selection());
        self.set_mode(InteractionMode::BoxSelecting);
        self.listener.box_select_changed(self.selection.box_rect());
    }

    fn start_pan(&mut self, screen: Point) {
        if !self.begin_gesture(InteractionMode::Panning) {
            return;
        }
        self.pan_last = Some(screen);
        self.set_mode(InteractionMode::Panning);
    }

    /// Pointer moved to a screen point.
    pub fn pointer_move(&mut self, screen: Point) {
        match self.mode {
            InteractionMode::Idle => trace!("pointer move ignored: idle"),
            InteractionMode::DraggingNode => {
                if let Some((node, position)) = self.drag.move_to(screen, &self.transform) {
                    self.listener.node_dragged(node, position);
                }
            }
            InteractionMode::DrawingConnection => {
                if let Some(preview) = self.draw.move_to(screen, &self.transform) {
                    self.listener.connection_preview(&preview);
                }
            }
            InteractionMode::BoxSelecting => {
                let canvas = screen_to_canvas(screen, &self.transform);
                let rect = self.selection.update_box(canvas);
                self.listener.box_select_changed(rect);
            }
            InteractionMode::Panning => {
                if let Some(last) = self.pan_last {
                    let delta = screen - last;
                    self.pan_by(delta.x, delta.y);
                    if screen.is_finite() {
                        self.pan_last = Some(screen);
                    }
                }
            }
        }
    }

    /// Pointer released over the canvas. `drop_target` is a port the host
    /// knows the pointer was released on, if any.
    pub fn pointer_up(&mut self, screen: Point, drop_target: Option<PortRef>) {
        let pointer = screen.is_finite().then_some(screen);
        self.finish_gesture(pointer, drop_target);
    }

    /// Pointer released anywhere, possibly outside the canvas. Resolves the
    /// active gesture at its last known position.
    pub fn global_pointer_up(&mut self) {
        self.finish_gesture(None, None);
    }

    /// The hosting window lost focus. Cancels the active gesture.
    pub fn window_blur(&mut self) {
        self.cancel_gesture();
    }

    // === Viewport ===

    /// Zoom by `factor` keeping the canvas point under `screen` fixed.
    pub fn zoom_at(&mut self, screen: Point, factor: f32) {
        let before = self.transform;
        self.transform.zoom_at(screen, factor, self.config.scale_bounds);
        if self.transform != before {
            self.listener.transform_changed(&self.transform);
        }
    }

    /// Return to 100% zoom around the viewport center.
    pub fn reset_zoom(&mut self) {
        let before = self.transform;
        self.transform
            .zoom_to(self.zoom_anchor(), 1.0, self.config.scale_bounds);
        if self.transform != before {
            self.listener.transform_changed(&self.transform);
        }
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        let before = self.transform;
        self.transform.pan_by(dx, dy);
        if self.transform != before {
            self.listener.transform_changed(&self.transform);
        }
    }

    /// Replace the transform. The scale is clamped.
    pub fn set_transform(&mut self, transform: Transform) {
        let next = Transform::new(
            transform.pan_x,
            transform.pan_y,
            transform.scale,
            self.config.scale_bounds,
        );
        if next != self.transform {
            self.transform = next;
            self.listener.transform_changed(&self.transform);
        }
    }

    fn zoom_anchor(&self) -> Point {
        self.viewport
            .map_or(Point::ORIGIN, |size| Point::new(size.x / 2.0, size.y / 2.0))
    }

    // === Keyboard ===

    /// Handle a key press. Returns the intent it mapped to, if any.
    pub fn key_down(&mut self, chord: KeyChord) -> Option<ShortcutIntent> {
        let intent = self.shortcuts.lookup(&chord)?;
        self.dispatch_intent(intent);
        Some(intent)
    }

    /// Run an intent as if its shortcut had been pressed.
    ///
    /// Escape cancels the active gesture, or clears the selection when idle.
    /// Every other intent is ignored while a gesture is active.
    pub fn dispatch_intent(&mut self, intent: ShortcutIntent) {
        if intent == ShortcutIntent::Escape {
            if self.mode == InteractionMode::Idle {
                self.clear_selection();
            } else {
                self.cancel_gesture();
            }
            return;
        }
        if self.mode != InteractionMode::Idle {
            trace!("{intent:?} ignored during {:?}", self.mode);
            return;
        }

        match intent {
            ShortcutIntent::Undo => {
                self.undo();
            }
            ShortcutIntent::Redo => {
                self.redo();
            }
            ShortcutIntent::Delete => {
                self.delete_selected();
            }
            ShortcutIntent::SelectAll => self.select_all(),
            ShortcutIntent::Save => {
                self.save();
            }
            ShortcutIntent::ZoomIn => self.zoom_at(self.zoom_anchor(), self.config.zoom_step),
            ShortcutIntent::ZoomOut => self.zoom_at(self.zoom_anchor(), 1.0 / self.config.zoom_step),
            ShortcutIntent::ResetZoom => self.reset_zoom(),
            ShortcutIntent::ToggleDeactivate => {
                self.toggle_deactivated();
            }
            ShortcutIntent::Escape => {}
        }
    }

    // === Selection ===

    pub fn select_all(&mut self) {
        if self.selection.select_all(&self.graph) {
            self.notify_selection();
        }
    }

    pub fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.notify_selection();
        }
    }

    pub fn select(&mut self, target: SelectionTarget, toggle: bool) {
        if self.selection.click(target, toggle) {
            self.notify_selection();
        }
    }

    // === Mutations ===

    /// Insert a node. Its position is snapped to the grid when snapping is on.
    pub fn add_node(&mut self, mut node: Node) -> Result<NodeId> {
        self.ensure_idle("add node")?;
        if self.config.snap_to_grid && node.position.is_finite() {
            node.position = snap_point(node.position, self.config.grid_size);
        }
        let id = node.id;
        self.commit(GraphMutation::AddNode(node))?;
        Ok(id)
    }

    /// Create and insert a node of `node_type` at a canvas position.
    pub fn create_node(&mut self, node_type: NodeType, position: Point) -> Result<NodeId> {
        self.add_node(Node::new(node_type, position))
    }

    /// Replace a node's step configuration. Returns whether it changed.
    pub fn update_node_config(&mut self, node: NodeId, config: serde_json::Value) -> Result<bool> {
        Ok(self.commit(GraphMutation::UpdateConfig { node, config })?)
    }

    pub fn set_deactivated(&mut self, nodes: Vec<NodeId>, deactivated: bool) -> Result<bool> {
        self.ensure_idle("set deactivated")?;
        Ok(self.commit(GraphMutation::SetDeactivated { nodes, deactivated })?)
    }

    /// Deactivate the selected nodes, or reactivate them if all already are.
    pub fn toggle_deactivated(&mut self) -> bool {
        if self.ensure_idle("toggle deactivated").is_err() {
            return false;
        }
        let nodes = self.selection.selected_nodes();
        if nodes.is_empty() {
            return false;
        }
        let all_off = nodes
            .iter()
            .filter_map(|id| self.graph.node(*id))
            .all(|n| n.deactivated);
        self.commit(GraphMutation::SetDeactivated {
            nodes,
            deactivated: !all_off,
        })
        .unwrap_or(false)
    }

    /// Delete the selected nodes and connections, cascading to connections
    /// incident to deleted nodes. One history entry.
    pub fn delete_selected(&mut self) -> bool {
        if self.ensure_idle("delete").is_err() {
            return false;
        }
        let nodes = self.selection.selected_nodes();
        let connections = self.selection.selected_connections();
        if nodes.is_empty() && connections.is_empty() {
            trace!("delete ignored: nothing selected");
            return false;
        }
        // Delete never fails: missing ids are skipped.
        self.commit(GraphMutation::Delete { nodes, connections })
            .unwrap_or(false)
    }

    /// Structural mutations are refused while a gesture owns the graph.
    fn ensure_idle(&self, action: &str) -> Result<()> {
        if self.mode == InteractionMode::Idle {
            return Ok(());
        }
        trace!("{} refused during {:?}", action, self.mode);
        Err(EditorError::GestureActive(self.mode))
    }

    // === History ===

    pub fn undo(&mut self) -> bool {
        if self.mode != InteractionMode::Idle {
            trace!("undo ignored during {:?}", self.mode);
            return false;
        }
        match self.history.undo(self.graph.snapshot()) {
            Some(previous) => {
                debug!("undo");
                self.graph.restore(previous);
                self.graph_replaced();
                true
            }
            None => {
                trace!("nothing to undo");
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.mode != InteractionMode::Idle {
            trace!("redo ignored during {:?}", self.mode);
            return false;
        }
        match self.history.redo(self.graph.snapshot()) {
            Some(next) => {
                debug!("redo");
                self.graph.restore(next);
                self.graph_replaced();
                true
            }
            None => {
                trace!("nothing to redo");
                false
            }
        }
    }

    // === Persistence hand-off ===

    /// Snapshot the graph for the host to persist.
    pub fn save(&mut self) -> GraphSnapshot {
        let snapshot = self.graph.snapshot();
        info!(
            "save requested: {} nodes, {} connections",
            snapshot.nodes.len(),
            snapshot.connections.len()
        );
        self.listener.save_requested(&snapshot);
        snapshot
    }

    /// Replace the whole graph with external data.
    ///
    /// Invalid parts are dropped rather than rejected. History and selection
    /// are reset.
    pub fn load(&mut self, snapshot: GraphSnapshot) -> SanitizeReport {
        self.cancel_gesture();
        let (graph, report) = Graph::sanitize(snapshot, &self.registry);
        if !report.is_clean() {
            warn!(
                "loaded graph was sanitized: {} duplicate nodes dropped, {} positions reset, {} connections dropped",
                report.dropped_nodes, report.reset_positions, report.dropped_connections
            );
        }
        info!(
            "loaded {} nodes, {} connections",
            graph.nodes().len(),
            graph.connections().len()
        );
        self.graph = graph;
        self.history.clear();
        let had_selection = self.selection.clear();
        self.graph_replaced();
        if had_selection {
            self.notify_selection();
        }
        report
    }

    pub fn load_json(&mut self, json: &str) -> Result<SanitizeReport> {
        let snapshot = GraphSnapshot::from_json(json)?;
        Ok(self.load(snapshot))
    }

    /// Mirror the node selection into a Slint model of id strings.
    #[cfg(feature = "slint")]
    pub fn sync_selection_to_model(&self, model: &slint::VecModel<slint::SharedString>) {
        self.selection.sync_to_model(model);
    }

    /// Take the node selection from a Slint model of id strings. Ids that
    /// are malformed or not in the graph are skipped.
    #[cfg(feature = "slint")]
    pub fn sync_selection_from_model(
        &mut self,
        model: &dyn slint::Model<Data = slint::SharedString>,
    ) -> bool {
        if !self.selection.sync_from_model(model, &self.graph) {
            return false;
        }
        self.notify_selection();
        true
    }

    /// Move nodes to hierarchical layout positions as one history entry.
    #[cfg(feature = "layout")]
    pub fn auto_arrange(&mut self, options: &crate::layout::LayoutOptions) -> bool {
        if self.mode != InteractionMode::Idle {
            trace!("auto arrange ignored during {:?}", self.mode);
            return false;
        }
        let moves = crate::layout::arrange(&self.graph, &self.config.node_metrics, options);
        self.commit(GraphMutation::MoveNodes(moves)).unwrap_or(false)
    }
}
