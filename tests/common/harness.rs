//! Test harness around a [`NodeEditor`] with a recording listener.
//!
//! The default scene is a trigger A at (0, 0) and an AI agent B at (0, 200),
//! both 180x80. With the identity transform, screen and canvas coincide:
//!
//! - A.output is at (180, 40)
//! - B.input is at (0, 240), B.output at (180, 240)
//! - B.tool is at (60, 280), B.memory at (120, 280)

#![allow(dead_code)]

use super::CallbackTracker;
use workflow_node_editor::{
    EditorConfig, Key, KeyChord, Modifiers, NodeEditor, NodeId, NodeType, Point, PointerButton,
    PortRef,
};

pub struct EditorHarness {
    pub editor: NodeEditor<CallbackTracker>,
    pub tracker: CallbackTracker,
    pub a: NodeId,
    pub b: NodeId,
}

impl EditorHarness {
    /// Default config, trigger A and agent B.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let tracker = CallbackTracker::new();
        let mut editor = NodeEditor::new(config, tracker.clone()).unwrap();
        let a = editor.create_node(NodeType::Trigger, Point::new(0.0, 0.0)).unwrap();
        let b = editor.create_node(NodeType::AiAgent, Point::new(0.0, 200.0)).unwrap();
        tracker.clear();
        Self { editor, tracker, a, b }
    }

    /// An editor with no nodes.
    pub fn empty() -> NodeEditor<CallbackTracker> {
        NodeEditor::new(EditorConfig::default(), CallbackTracker::new()).unwrap()
    }

    pub fn add(&mut self, node_type: NodeType, x: f32, y: f32) -> NodeId {
        self.editor.create_node(node_type, Point::new(x, y)).unwrap()
    }

    pub fn position(&self, node: NodeId) -> Point {
        self.editor.graph().node(node).unwrap().position
    }

    pub fn port(&self, node: NodeId, port: &str) -> PortRef {
        PortRef::new(node, port)
    }

    // === Mouse event helpers ===

    pub fn mouse_down(&mut self, x: f32, y: f32) {
        self.editor
            .pointer_down(Point::new(x, y), PointerButton::Primary, Modifiers::NONE);
    }

    pub fn mouse_down_with(&mut self, x: f32, y: f32, modifiers: Modifiers) {
        self.editor
            .pointer_down(Point::new(x, y), PointerButton::Primary, modifiers);
    }

    pub fn mouse_move(&mut self, x: f32, y: f32) {
        self.editor.pointer_move(Point::new(x, y));
    }

    pub fn mouse_up(&mut self, x: f32, y: f32) {
        self.editor.pointer_up(Point::new(x, y), None);
    }

    /// Simulate a complete click (down + up) at the given position.
    pub fn click(&mut self, x: f32, y: f32) {
        self.mouse_down(x, y);
        self.mouse_up(x, y);
    }

    pub fn shift_click(&mut self, x: f32, y: f32) {
        self.mouse_down_with(x, y, Modifiers::shift());
        self.mouse_up(x, y);
    }

    /// Simulate a complete drag from start to end.
    pub fn drag(&mut self, start_x: f32, start_y: f32, end_x: f32, end_y: f32) {
        self.mouse_down(start_x, start_y);
        self.mouse_move(end_x, end_y);
        self.mouse_up(end_x, end_y);
    }

    /// Draw from A.output and release at (x, y).
    pub fn draw_from_a(&mut self, x: f32, y: f32) {
        self.drag(180.0, 40.0, x, y);
    }

    // === Keyboard event helpers ===

    pub fn key(&mut self, key: Key) {
        self.editor.key_down(KeyChord::plain(key));
    }

    pub fn ctrl(&mut self, c: char) {
        self.editor.key_down(KeyChord::ctrl(c));
    }

    pub fn ctrl_shift(&mut self, c: char) {
        self.editor.key_down(KeyChord::ctrl_shift(c));
    }
}

impl Default for EditorHarness {
    fn default() -> Self {
        Self::new()
    }
}
