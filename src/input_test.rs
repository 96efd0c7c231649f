#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

// =============================================================
// Tools
// =============================================================

#[test]
fn default_tool_is_select() {
    assert_eq!(Tool::default(), Tool::Select);
}

#[test]
fn select_does_not_create_shapes() {
    assert!(!Tool::Select.creates_shape());
}

#[test]
fn every_other_tool_creates_a_shape() {
    let tools = [
        Tool::Rect,
        Tool::Ellipse,
        Tool::Text,
        Tool::Image,
        Tool::Line,
        Tool::Arrow,
        Tool::Polygon,
        Tool::DataCard,
        Tool::Mermaid,
    ];
    for tool in tools {
        assert!(tool.creates_shape(), "{tool:?}");
    }
}

// =============================================================
// Modifiers
// =============================================================

#[test]
fn command_is_ctrl_or_meta() {
    assert!(!Modifiers::default().command());
    assert!(Modifiers { ctrl: true, ..Modifiers::default() }.command());
    assert!(Modifiers { meta: true, ..Modifiers::default() }.command());
}

#[test]
fn shift_alone_is_not_command() {
    assert!(!Modifiers { shift: true, ..Modifiers::default() }.command());
}

// =============================================================
// UI state
// =============================================================

#[test]
fn fresh_ui_state_is_inert() {
    let ui = UiState::default();
    assert_eq!(ui.tool, Tool::Select);
    assert!(ui.selected_id.is_none());
    assert!(ui.clipboard.is_none());
    assert!(ui.editing_text.is_none());
    assert!(ui.image_status.is_empty());
}

#[test]
fn default_gesture_is_idle() {
    assert!(matches!(Gesture::default(), Gesture::Idle));
}
