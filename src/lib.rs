//! # Workflow Node Editor
//!
//! Toolkit-independent interaction core for node-based visual workflow
//! editors: pan/zoom, grid-snapped node dragging, port-compatible connection
//! drawing with magnetic snapping, multi-selection and bounded undo/redo.
//!
//! The host feeds pointer and keyboard events into a [`NodeEditor`] and draws
//! what its [`EditorListener`] is told. The editor owns the [`Graph`] and is
//! the only thing that writes to it.
//!
//! ## Quick Start
//!
//! ```
//! use workflow_node_editor::{
//!     EditorConfig, Modifiers, NodeEditor, NodeType, Point, PointerButton,
//! };
//!
//! let mut editor = NodeEditor::new(EditorConfig::default(), ()).unwrap();
//! let trigger = editor.create_node(NodeType::Trigger, Point::new(0.0, 0.0)).unwrap();
//! let agent = editor.create_node(NodeType::AiAgent, Point::new(0.0, 200.0)).unwrap();
//!
//! // Drag from the trigger's output port and release next to the agent's input.
//! editor.pointer_down(Point::new(180.0, 40.0), PointerButton::Primary, Modifiers::NONE);
//! editor.pointer_move(Point::new(10.0, 235.0));
//! editor.pointer_up(Point::new(10.0, 235.0), None);
//!
//! let link = &editor.graph().connections()[0];
//! assert_eq!((link.from_node, link.to_node), (trigger, agent));
//!
//! editor.undo();
//! assert!(editor.graph().connections().is_empty());
//! ```
//!
//! ## Modules
//!
//! - [`coords`] - transform and pointer/canvas conversion
//! - [`ports`] - port kinds and the compatibility table
//! - [`graph`] - nodes, connections, snapshots, connection validation
//! - [`geometry`] / [`hit_test`] - port anchors and hit-testing
//! - [`drag`], [`connect`], [`selection`], [`history`] - the controllers
//! - [`editor`] - the orchestrator
//!
//! ## Features
//!
//! - `layout` - Sugiyama auto-arrange via `rust-sugiyama`
//! - `slint` - selection sync with Slint `VecModel`s

pub mod config;
pub mod connect;
pub mod coords;
pub mod drag;
pub mod editor;
pub mod error;
pub mod events;
pub mod geometry;
pub mod graph;
pub mod history;
#[cfg(feature = "layout")]
pub mod layout;
pub mod ports;
pub mod selection;
pub mod shortcuts;

pub use config::{EditorConfig, GestureConflictPolicy};
pub use connect::{ConnectionDrawController, ConnectionPreview, DrawOutcome};
pub use coords::{canvas_to_screen, screen_to_canvas, snap_point, snap_to_grid, Point, Rect, ScaleBounds, Transform};
pub use drag::{DragController, DragOutcome};
pub use editor::{HitTarget, InteractionMode, NodeEditor, PointerButton};
pub use error::{ConfigError, EditorError, GraphError, Result};
pub use events::EditorListener;
pub use geometry::{GeometryCache, NodeMetrics, PortAnchor};
pub use graph::{
    Connection, ConnectionId, ConnectionRequest, Graph, GraphMutation, GraphSnapshot, Node, NodeId,
    PortRef, SanitizeReport,
    // Connection validation framework
    BasicConnectionValidator, CapacityValidator, CompositeValidator, ConnectionValidator,
    NoDuplicatesValidator, ValidationError, ValidationResult,
};
pub use history::{HistoryController, HistoryState};
pub use hit_test::{find_nearest_port, find_node_at, nodes_in_selection_box, NodeBounds, NodeGeometry, PortGeometry};
pub use ports::{NodeType, PortDefinition, PortId, PortKind, PortRegistry};
pub use selection::{SelectionController, SelectionTarget};
pub use shortcuts::{Key, KeyChord, Modifiers, ShortcutIntent, ShortcutTable};
