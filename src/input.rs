//! Input model: tools, modifier keys, ephemeral UI state, and the gesture
//! state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `UiState` is everything the renderer needs beyond the scene itself
//! — the single selection, the copy clipboard, and per-shape image load
//! states — none of which is part of the persisted document. `Gesture` is
//! the active pointer interaction being tracked between pointer-down and
//! pointer-up, carrying the context needed to emit exactly one history
//! commit when the gesture ends.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::HashMap;

use crate::hit::ResizeAnchor;
use crate::shape::{EndpointEnd, ShapeId};
use crate::units::Point;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Select,
    /// Place a rectangle.
    Rect,
    /// Place an ellipse.
    Ellipse,
    /// Place a text block.
    Text,
    /// Place an image.
    Image,
    /// Place a straight line segment.
    Line,
    /// Place a directed arrow.
    Arrow,
    /// Place a regular polygon.
    Polygon,
    /// Place a data-card.
    DataCard,
    /// Place a mermaid-diagram block.
    Mermaid,
}

impl Tool {
    /// Whether this tool places a new shape on pointer-down.
    #[must_use]
    pub fn creates_shape(self) -> bool {
        self != Self::Select
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on Linux/Windows or Command on macOS — the shortcut modifier.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key, holding the name as reported by the browser
/// (e.g. `"Delete"`, `"Escape"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in device pixels.
    pub dx: f64,
    /// Vertical scroll amount in device pixels (positive = down).
    pub dy: f64,
}

/// Load lifecycle of an image shape's backing resource.
///
/// This is ephemeral UI state tied to the referenced asset, independent of
/// the shape lifecycle: it gates rendering (placeholder / fallback) but
/// never mutates the shape's stored geometry or source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    /// Load requested, resource not yet available.
    Loading,
    /// Resource available for painting.
    Loaded,
    /// Load failed; the fallback graphic is painted instead.
    Failed,
}

/// Persistent UI state visible to the renderer. Not part of the document.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// The single selected shape, if any.
    pub selected_id: Option<ShapeId>,
    /// Staged copy of a shape (Ctrl/Cmd+C), outside the scene and outside
    /// history, consumed by paste.
    pub clipboard: Option<crate::shape::Shape>,
    /// Shape whose text is being edited in the host overlay; suppresses
    /// Delete/Backspace shortcuts while set.
    pub editing_text: Option<ShapeId>,
    /// Per-shape image load state, dropped when the shape is deleted.
    pub image_status: HashMap<ShapeId, ImageStatus>,
}

/// The active pointer gesture.
///
/// Each variant carries the context needed to compute incremental deltas
/// during pointer-move and to decide, on pointer-up, whether anything
/// changed and therefore whether to commit one history entry.
#[derive(Debug, Clone)]
pub enum Gesture {
    /// No gesture in progress; waiting for the next pointer-down.
    Idle,
    /// Moving an existing shape.
    Dragging {
        /// Shape being moved.
        id: ShapeId,
        /// Logical-space offset from the pointer to the shape origin,
        /// captured at pointer-down so the shape doesn't jump.
        grab_offset: Point,
        /// Origin at the start of the drag, to detect a no-op gesture.
        orig: Point,
    },
    /// Sizing a newly placed shape by dragging from its anchor corner.
    Drawing {
        /// The provisional shape being sized.
        id: ShapeId,
        /// Logical-space corner where the drag started.
        anchor: Point,
        /// Constructor extents, restored when the gesture was a plain click.
        default_size: Point,
    },
    /// Resizing a shape by one of its eight handles.
    Resizing {
        /// Shape being resized.
        id: ShapeId,
        /// Which handle is being dragged.
        anchor: ResizeAnchor,
        /// Origin at the start of the resize.
        orig: Point,
        /// Extents at the start of the resize.
        orig_size: Point,
    },
    /// Rotating a shape by its rotate handle.
    Rotating {
        /// Shape being rotated.
        id: ShapeId,
        /// Rotation pivot (the shape center), logical space.
        center: Point,
        /// Rotation in degrees at the start of the gesture.
        orig_rotation: f64,
        /// Pointer angle at the start of the gesture, radians.
        start_angle: f64,
    },
    /// Repositioning one endpoint of a line or arrow.
    DraggingEndpoint {
        /// Connector being edited.
        id: ShapeId,
        /// Which endpoint is being dragged.
        end: EndpointEnd,
        /// Endpoint position at the start of the drag, absolute logical.
        orig: Point,
    },
}

impl Default for Gesture {
    fn default() -> Self {
        Self::Idle
    }
}
