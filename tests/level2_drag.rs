//! Level 2: Node Drag Tests
//!
//! Pointer-driven relocation, grid snapping, cancellation and how a drag
//! lands in history.

mod common;

use common::harness::EditorHarness;
use workflow_node_editor::{EditorConfig, InteractionMode, Key, Point};

// ============================================================================
// Basic Drag
// ============================================================================

#[test]
fn test_drag_snaps_to_grid() {
    let mut h = EditorHarness::new();
    h.drag(0.0, 0.0, 37.0, 58.0);

    assert_eq!(h.position(h.a), Point::new(40.0, 60.0));
    assert_eq!(h.editor.mode(), InteractionMode::Idle);
}

#[test]
fn test_drag_keeps_grab_offset() {
    let mut h = EditorHarness::new();
    // Grab A 50 units into its body, move the pointer 100 units right.
    h.drag(50.0, 10.0, 150.0, 10.0);
    assert_eq!(h.position(h.a), Point::new(100.0, 0.0));
}

#[test]
fn test_drag_without_snapping() {
    let config = EditorConfig {
        snap_to_grid: false,
        ..EditorConfig::default()
    };
    let mut h = EditorHarness::with_config(config);
    h.drag(0.0, 0.0, 37.0, 58.0);
    assert_eq!(h.position(h.a), Point::new(37.0, 58.0));
}

#[test]
fn test_drag_callbacks() {
    let mut h = EditorHarness::new();
    h.mouse_down(0.0, 0.0);
    h.mouse_move(8.0, 8.0);
    h.mouse_move(37.0, 58.0);
    h.mouse_up(37.0, 58.0);

    assert_eq!(*h.tracker.drag_started.borrow(), vec![(h.a, Point::ORIGIN)]);
    assert_eq!(
        *h.tracker.node_dragged.borrow(),
        vec![(h.a, Point::new(0.0, 0.0)), (h.a, Point::new(40.0, 60.0))]
    );
    assert_eq!(*h.tracker.drag_ended.borrow(), vec![(h.a, Point::new(40.0, 60.0))]);
}

#[test]
fn test_graph_unchanged_until_release() {
    let mut h = EditorHarness::new();
    h.mouse_down(0.0, 0.0);
    h.mouse_move(200.0, 200.0);

    assert_eq!(h.position(h.a), Point::ORIGIN);
    assert_eq!(h.editor.drag_position(), Some((h.a, Point::new(200.0, 200.0))));
    assert_eq!(h.editor.mode(), InteractionMode::DraggingNode);
}

#[test]
fn test_drag_selects_node() {
    let mut h = EditorHarness::new();
    h.drag(0.0, 0.0, 100.0, 100.0);
    assert_eq!(h.editor.selection().selected_nodes(), vec![h.a]);
}

// ============================================================================
// History
// ============================================================================

#[test]
fn test_drag_is_one_history_entry() {
    let mut h = EditorHarness::new();
    let before = h.editor.undo_depth();

    h.mouse_down(0.0, 0.0);
    for i in 1..=20 {
        h.mouse_move(i as f32 * 10.0, i as f32 * 5.0);
    }
    h.mouse_up(200.0, 100.0);

    assert_eq!(h.editor.undo_depth(), before + 1);
    assert!(h.editor.undo());
    assert_eq!(h.position(h.a), Point::ORIGIN);
}

#[test]
fn test_drag_back_to_start_records_nothing() {
    let mut h = EditorHarness::new();
    let before = h.editor.undo_depth();
    h.mouse_down(0.0, 0.0);
    h.mouse_move(100.0, 100.0);
    h.mouse_up(4.0, 3.0);

    assert_eq!(h.position(h.a), Point::ORIGIN);
    assert_eq!(h.editor.undo_depth(), before);
}

// ============================================================================
// Cancel
// ============================================================================

#[test]
fn test_escape_cancels_drag() {
    let mut h = EditorHarness::new();
    let before = h.editor.undo_depth();
    h.mouse_down(0.0, 0.0);
    h.mouse_move(300.0, 300.0);
    h.key(Key::Escape);

    assert_eq!(h.editor.mode(), InteractionMode::Idle);
    assert_eq!(h.position(h.a), Point::ORIGIN);
    assert_eq!(h.editor.undo_depth(), before);
    assert_eq!(*h.tracker.drag_ended.borrow(), vec![(h.a, Point::ORIGIN)]);

    // The release that follows has nothing to end.
    h.mouse_up(300.0, 300.0);
    assert_eq!(h.position(h.a), Point::ORIGIN);
    assert_eq!(h.tracker.drag_ended.borrow().len(), 1);
}

#[test]
fn test_window_blur_cancels_drag() {
    let mut h = EditorHarness::new();
    h.mouse_down(0.0, 0.0);
    h.mouse_move(300.0, 300.0);
    h.editor.window_blur();
    h.editor.window_blur();

    assert_eq!(h.editor.mode(), InteractionMode::Idle);
    assert_eq!(h.position(h.a), Point::ORIGIN);
    assert_eq!(h.tracker.drag_ended.borrow().len(), 1);
}

#[test]
fn test_global_pointer_up_commits_last_position() {
    let mut h = EditorHarness::new();
    h.mouse_down(0.0, 0.0);
    h.mouse_move(37.0, 58.0);
    h.editor.global_pointer_up();

    assert_eq!(h.editor.mode(), InteractionMode::Idle);
    assert_eq!(h.position(h.a), Point::new(40.0, 60.0));
}

#[test]
fn test_moves_after_release_are_ignored() {
    let mut h = EditorHarness::new();
    h.drag(0.0, 0.0, 40.0, 40.0);
    h.mouse_move(400.0, 400.0);
    h.mouse_move(500.0, 500.0);

    assert_eq!(h.position(h.a), Point::new(40.0, 40.0));
    assert_eq!(h.tracker.node_dragged.borrow().len(), 1);
}
