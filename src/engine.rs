//! Canvas controller: wires pointer and keyboard events to the scene.
//!
//! All mutation funnels through [`EngineCore::apply`] — an explicit
//! [`Command`] reducer — or through the gesture handlers, which mutate the
//! live scene transiently during a drag and issue exactly one history
//! commit at gesture end. The host consumes the [`Action`]s returned from
//! every entry point; the engine never calls out on its own.
//!
//! [`EngineCore`] carries no browser dependencies and is what the tests
//! exercise. [`Engine`] wraps it together with the `HtmlCanvasElement` it
//! renders to.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::consts::{DUPLICATE_OFFSET, HANDLE_RADIUS_PX, ROTATE_HANDLE_OFFSET_PX, ZOOM_STEP};
use crate::doc::{CanvasSettings, DocumentPayload, PageMode, Scene};
use crate::hit::{self, HitPart, ResizeAnchor};
use crate::history::History;
use crate::input::{Button, Gesture, ImageStatus, Key, Modifiers, Tool, UiState, WheelDelta};
use crate::render;
use crate::shape::{EndpointEnd, Shape, ShapeId, ShapeKind};
use crate::units::{Point, Viewport, quantize};

/// An explicit editing intent, dispatched through [`EngineCore::apply`].
///
/// Discrete commands that change the document commit exactly one history
/// entry; selection, tool, and clipboard commands never commit.
#[derive(Debug, Clone)]
pub enum Command {
    /// Change the selection (`None` deselects).
    Select(Option<ShapeId>),
    /// Change the active tool.
    SetTool(Tool),
    /// Insert a shape at the top of the z-order and select it.
    Insert(Shape),
    /// Move a shape's origin.
    MoveTo { id: ShapeId, x: f64, y: f64 },
    /// Reposition and resize a shape's bounding box.
    ResizeTo { id: ShapeId, x: f64, y: f64, width: f64, height: f64 },
    /// Set a shape's rotation in degrees.
    RotateTo { id: ShapeId, degrees: f64 },
    /// Move one connector endpoint (absolute logical coordinates).
    SetEndpoint { id: ShapeId, end: EndpointEnd, x: f64, y: f64 },
    /// Replace a text shape's content.
    SetText { id: ShapeId, content: String },
    /// Replace a mermaid-diagram shape's source verbatim.
    SetDiagramSource { id: ShapeId, source: String },
    /// Write an entity-link collaborator result into a data-card.
    LinkEntity { id: ShapeId, data_kind: String, data_id: String, display_name: String },
    /// Remove a shape from the scene.
    Delete(ShapeId),
    /// Stage the selected shape on the clipboard.
    Copy,
    /// Insert an offset copy of the clipboard shape.
    Paste,
    /// Insert an offset copy of the selected shape.
    Duplicate,
    /// Step history back.
    Undo,
    /// Step history forward.
    Redo,
}

/// Outputs returned from engine entry points for the host to process.
#[derive(Debug, Clone)]
pub enum Action {
    /// The scene changed visually; the host should schedule a redraw.
    RenderNeeded,
    /// Set the CSS cursor over the canvas.
    SetCursor(String),
    /// Ctrl/Cmd+S — the host should fetch [`EngineCore::payload`] and
    /// persist it.
    SaveRequested,
    /// A shape entered the scene.
    ShapeInserted(Shape),
    /// A shape's stored fields changed.
    ShapeUpdated(Shape),
    /// A shape left the scene.
    ShapeDeleted { id: ShapeId },
    /// Open the host text editor for a text shape.
    EditTextRequested { id: ShapeId, content: String },
    /// Open the entity-link selector for a data-card.
    LinkEntityRequested { id: ShapeId },
    /// Open the diagram editor for a mermaid-diagram shape.
    EditDiagramRequested { id: ShapeId, source: String },
    /// Begin loading an image shape's backing resource.
    ImageLoadRequested { id: ShapeId, src: String },
}

/// Core engine state — all logic that doesn't depend on the canvas element.
///
/// Separated from [`Engine`] so it can be tested without WASM/browser
/// dependencies.
pub struct EngineCore {
    /// The live scene. History holds copies, never this value.
    pub doc: Scene,
    /// Snapshot undo/redo stacks.
    pub history: History,
    /// Session canvas configuration; not versioned by undo/redo.
    pub settings: CanvasSettings,
    /// Zoom/pan state.
    pub viewport: Viewport,
    /// Selection, clipboard, tool, and ephemeral image states.
    pub ui: UiState,
    gesture: Gesture,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_settings(CanvasSettings::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine over the given canvas configuration and an empty scene.
    #[must_use]
    pub fn with_settings(settings: CanvasSettings) -> Self {
        let doc = Scene::new();
        Self {
            history: History::new(doc.clone()),
            doc,
            settings,
            viewport: Viewport::default(),
            ui: UiState::default(),
            gesture: Gesture::Idle,
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
        }
    }

    // --- Persistence boundary ---

    /// Hydrate the session from a persisted document. Resets history and
    /// selection around the loaded scene.
    pub fn load(&mut self, payload: DocumentPayload) -> Vec<Action> {
        self.settings = payload.settings;
        self.doc = Scene::from_shapes(payload.shapes);
        self.history.reset(self.doc.clone());
        self.ui.selected_id = None;
        self.ui.editing_text = None;
        self.ui.image_status.clear();
        self.gesture = Gesture::Idle;

        let mut actions = Vec::new();
        for shape in self.doc.iter() {
            if let ShapeKind::Image { src, .. } = &shape.kind {
                self.ui.image_status.insert(shape.id, ImageStatus::Loading);
                actions.push(Action::ImageLoadRequested { id: shape.id, src: src.clone() });
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// The current document as an opaque serializable payload.
    #[must_use]
    pub fn payload(&self) -> DocumentPayload {
        DocumentPayload { settings: self.settings.clone(), shapes: self.doc.shapes().to_vec() }
    }

    // --- Queries ---

    /// The currently selected shape id, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ShapeId> {
        self.ui.selected_id
    }

    /// Look up a shape by id.
    #[must_use]
    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.doc.get(id)
    }

    /// Whether a pointer gesture is in progress.
    #[must_use]
    pub fn gesture_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    // --- Settings setters (never committed to history) ---

    pub fn set_grid_enabled(&mut self, enabled: bool) -> Vec<Action> {
        self.settings.grid_enabled = enabled;
        vec![Action::RenderNeeded]
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) -> Vec<Action> {
        self.settings.snap_enabled = enabled;
        Vec::new()
    }

    pub fn set_grid_size(&mut self, size: f64) -> Vec<Action> {
        if size > 0.0 {
            self.settings.grid_size = size;
        }
        vec![Action::RenderNeeded]
    }

    pub fn set_background(&mut self, color: String) -> Vec<Action> {
        self.settings.background = color;
        vec![Action::RenderNeeded]
    }

    pub fn set_page_size(&mut self, width: f64, height: f64) -> Vec<Action> {
        if width > 0.0 && height > 0.0 {
            self.settings.width = width;
            self.settings.height = height;
        }
        vec![Action::RenderNeeded]
    }

    // --- Image lifecycle (ephemeral, never touches the shape) ---

    /// The host finished loading an image shape's resource.
    pub fn notify_image_loaded(&mut self, id: ShapeId) -> Vec<Action> {
        if self.doc.contains(id) {
            self.ui.image_status.insert(id, ImageStatus::Loaded);
            return vec![Action::RenderNeeded];
        }
        Vec::new()
    }

    /// The host failed to load an image shape's resource. The shape keeps
    /// its stored source; only the fallback drawable changes.
    pub fn notify_image_failed(&mut self, id: ShapeId) -> Vec<Action> {
        if self.doc.contains(id) {
            self.ui.image_status.insert(id, ImageStatus::Failed);
            return vec![Action::RenderNeeded];
        }
        Vec::new()
    }

    // --- Command reducer ---

    /// Apply one editing intent. The single mutation surface for discrete
    /// (non-gesture) edits.
    #[allow(clippy::too_many_lines)]
    pub fn apply(&mut self, command: Command) -> Vec<Action> {
        match command {
            Command::Select(id) => {
                self.ui.selected_id = id.filter(|id| self.doc.contains(*id));
                vec![Action::RenderNeeded]
            }
            Command::SetTool(tool) => {
                self.ui.tool = tool;
                Vec::new()
            }
            Command::Insert(shape) => {
                let id = shape.id;
                let mut actions = self.insert_uncommitted(shape);
                self.commit();
                if let Some(inserted) = self.doc.get(id) {
                    actions.push(Action::ShapeInserted(inserted.clone()));
                }
                actions.push(Action::RenderNeeded);
                actions
            }
            Command::MoveTo { id, x, y } => self.mutate_geometry(id, |shape| {
                shape.x = x;
                shape.y = y;
            }),
            Command::ResizeTo { id, x, y, width, height } => self.mutate_geometry(id, |shape| {
                apply_box(shape, x, y, width.max(0.0), height.max(0.0));
            }),
            Command::RotateTo { id, degrees } => self.mutate_geometry(id, |shape| {
                shape.rotation = degrees;
            }),
            Command::SetEndpoint { id, end, x, y } => self.mutate_geometry(id, |shape| {
                shape.set_endpoint(end, Point::new(x, y));
            }),
            Command::SetText { id, content } => self.mutate_payload(id, |shape| {
                if let ShapeKind::Text { content: existing, .. } = &mut shape.kind {
                    *existing = content;
                    true
                } else {
                    false
                }
            }),
            Command::SetDiagramSource { id, source } => self.mutate_payload(id, |shape| {
                if let ShapeKind::MermaidDiagram { source: existing } = &mut shape.kind {
                    *existing = source;
                    true
                } else {
                    false
                }
            }),
            Command::LinkEntity { id, data_kind, data_id, display_name } => {
                self.mutate_payload(id, |shape| {
                    if let ShapeKind::DataCard {
                        data_kind: kind_field,
                        data_id: id_field,
                        display_name: name_field,
                        ..
                    } = &mut shape.kind
                    {
                        *kind_field = data_kind;
                        *id_field = data_id;
                        *name_field = display_name;
                        true
                    } else {
                        false
                    }
                })
            }
            Command::Delete(id) => {
                let Some(_removed) = self.doc.remove(id) else {
                    return Vec::new();
                };
                self.ui.image_status.remove(&id);
                if self.ui.selected_id == Some(id) {
                    self.ui.selected_id = None;
                }
                if self.ui.editing_text == Some(id) {
                    self.ui.editing_text = None;
                }
                self.commit();
                vec![Action::ShapeDeleted { id }, Action::RenderNeeded]
            }
            Command::Copy => {
                self.ui.clipboard =
                    self.ui.selected_id.and_then(|id| self.doc.get(id)).cloned();
                Vec::new()
            }
            Command::Paste => {
                let Some(staged) = self.ui.clipboard.clone() else {
                    return Vec::new();
                };
                self.insert_offset_copy(staged)
            }
            Command::Duplicate => {
                let Some(selected) =
                    self.ui.selected_id.and_then(|id| self.doc.get(id)).cloned()
                else {
                    return Vec::new();
                };
                self.insert_offset_copy(selected)
            }
            Command::Undo => {
                if !self.history.undo() {
                    return Vec::new();
                }
                self.after_history_step()
            }
            Command::Redo => {
                if !self.history.redo() {
                    return Vec::new();
                }
                self.after_history_step()
            }
        }
    }

    /// Decode a drag-and-drop shape payload and insert it. Unrecognized
    /// payloads are silently skipped.
    pub fn insert_from_payload(&mut self, json: &str) -> Vec<Action> {
        let Ok(mut shape) = serde_json::from_str::<Shape>(json) else {
            return Vec::new();
        };
        if self.doc.contains(shape.id) {
            shape.id = uuid::Uuid::new_v4();
        }
        self.apply(Command::Insert(shape))
    }

    /// Close the host text editor, writing the result back.
    pub fn finish_text_edit(&mut self, id: ShapeId, content: String) -> Vec<Action> {
        self.ui.editing_text = None;
        self.apply(Command::SetText { id, content })
    }

    // --- Pointer events ---

    /// Pointer-down in device coordinates.
    pub fn on_pointer_down(&mut self, device: Point, button: Button, _mods: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let logical = self.viewport.to_logical(self.settings.unit, device);

        if self.ui.tool.creates_shape() {
            return self.start_drawing(logical);
        }

        let slop = self.handle_slop();
        let rotate_offset = self.rotate_offset();
        match hit::hit_test(logical, &self.doc, self.ui.selected_id, slop, rotate_offset) {
            Some(hit) => self.start_gesture_on_hit(hit.shape_id, hit.part, logical),
            None => {
                self.ui.selected_id = None;
                vec![Action::RenderNeeded]
            }
        }
    }

    /// Pointer-move in device coordinates. In-flight gestures mutate the
    /// live scene only; nothing is committed until pointer-up.
    pub fn on_pointer_move(&mut self, device: Point, mods: Modifiers) -> Vec<Action> {
        let logical = self.viewport.to_logical(self.settings.unit, device);

        match self.gesture.clone() {
            Gesture::Idle => self.hover_cursor(logical),
            Gesture::Dragging { id, grab_offset, .. } => {
                let x = self.snap(logical.x - grab_offset.x);
                let y = self.snap(logical.y - grab_offset.y);
                if let Some(shape) = self.doc.get_mut(id) {
                    shape.x = x;
                    shape.y = y;
                }
                vec![Action::RenderNeeded]
            }
            Gesture::Drawing { id, anchor, .. } => {
                let snapped = self.snap_point(logical);
                if let Some(shape) = self.doc.get_mut(id) {
                    size_drawing(shape, anchor, snapped);
                }
                vec![Action::RenderNeeded]
            }
            Gesture::Resizing { id, anchor, orig, orig_size } => {
                let snapped = self.snap_point(logical);
                if let Some(shape) = self.doc.get_mut(id) {
                    let (x, y, w, h) = resized_box(orig, orig_size, anchor, snapped);
                    let (w, h) = constrain_aspect(shape, anchor, w, h);
                    apply_box(shape, x, y, w, h);
                }
                vec![Action::RenderNeeded]
            }
            Gesture::Rotating { id, center, orig_rotation, start_angle } => {
                let angle = (logical.y - center.y).atan2(logical.x - center.x);
                let mut degrees = orig_rotation + (angle - start_angle).to_degrees();
                if mods.shift {
                    degrees = quantize(degrees, 15.0);
                }
                if let Some(shape) = self.doc.get_mut(id) {
                    shape.rotation = degrees;
                }
                vec![Action::RenderNeeded]
            }
            Gesture::DraggingEndpoint { id, end, .. } => {
                let snapped = self.snap_point(logical);
                if let Some(shape) = self.doc.get_mut(id) {
                    shape.set_endpoint(end, snapped);
                }
                vec![Action::RenderNeeded]
            }
        }
    }

    /// Pointer-up: end the gesture, committing one history entry if the
    /// document changed.
    pub fn on_pointer_up(&mut self, _device: Point, button: Button, _mods: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => Vec::new(),
            Gesture::Dragging { id, orig, .. } => {
                let moved = self
                    .doc
                    .get(id)
                    .is_some_and(|s| s.x != orig.x || s.y != orig.y);
                if moved {
                    self.commit_updated(id)
                } else {
                    Vec::new()
                }
            }
            Gesture::Drawing { id, default_size, .. } => {
                if let Some(shape) = self.doc.get_mut(id) {
                    if shape.width < 1.0 && shape.height < 1.0 {
                        restore_default_size(shape, default_size);
                    }
                }
                self.ui.tool = Tool::Select;
                let mut actions = match self.doc.get(id) {
                    Some(shape) => vec![Action::ShapeInserted(shape.clone())],
                    None => Vec::new(),
                };
                self.commit();
                actions.push(Action::RenderNeeded);
                actions
            }
            Gesture::Resizing { id, orig, orig_size, .. } => {
                let changed = self.doc.get(id).is_some_and(|s| {
                    s.x != orig.x
                        || s.y != orig.y
                        || s.width != orig_size.x
                        || s.height != orig_size.y
                });
                if changed {
                    self.commit_updated(id)
                } else {
                    Vec::new()
                }
            }
            Gesture::Rotating { id, orig_rotation, .. } => {
                let changed = self.doc.get(id).is_some_and(|s| s.rotation != orig_rotation);
                if changed {
                    self.commit_updated(id)
                } else {
                    Vec::new()
                }
            }
            Gesture::DraggingEndpoint { id, end, orig } => {
                let moved = self.doc.get(id).and_then(Shape::endpoints).is_some_and(|(a, b)| {
                    let now = match end {
                        EndpointEnd::A => a,
                        EndpointEnd::B => b,
                    };
                    now != orig
                });
                if moved {
                    self.commit_updated(id)
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Double-click opens the per-kind editor collaborator.
    pub fn on_double_click(&mut self, device: Point, _mods: Modifiers) -> Vec<Action> {
        let logical = self.viewport.to_logical(self.settings.unit, device);
        let slop = self.handle_slop();
        let rotate_offset = self.rotate_offset();
        let Some(hit) =
            hit::hit_test(logical, &self.doc, self.ui.selected_id, slop, rotate_offset)
        else {
            return Vec::new();
        };
        let Some(shape) = self.doc.get(hit.shape_id) else {
            return Vec::new();
        };
        match &shape.kind {
            ShapeKind::Text { content, .. } => {
                self.ui.editing_text = Some(shape.id);
                vec![Action::EditTextRequested { id: shape.id, content: content.clone() }]
            }
            ShapeKind::MermaidDiagram { source } => {
                vec![Action::EditDiagramRequested { id: shape.id, source: source.clone() }]
            }
            ShapeKind::DataCard { .. } => {
                vec![Action::LinkEntityRequested { id: shape.id }]
            }
            _ => Vec::new(),
        }
    }

    /// Wheel input: Ctrl/Cmd zooms about the cursor, otherwise pans (on a
    /// flexible surface). Viewport-only; never a document mutation.
    pub fn on_wheel(&mut self, device: Point, delta: WheelDelta, mods: Modifiers) -> Vec<Action> {
        if mods.command() {
            let factor = if delta.dy < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
            self.viewport.zoom_about(factor, device);
            return vec![Action::RenderNeeded];
        }
        if self.settings.page_mode == PageMode::Flexible {
            self.viewport.pan_x -= delta.dx;
            self.viewport.pan_y -= delta.dy;
            return vec![Action::RenderNeeded];
        }
        Vec::new()
    }

    /// Keyboard shortcuts recognized by the controller.
    pub fn on_key_down(&mut self, key: &Key, mods: Modifiers) -> Vec<Action> {
        let name = key.0.as_str();
        if mods.command() {
            return match name {
                "s" | "S" => vec![Action::SaveRequested],
                "z" | "Z" if mods.shift => self.apply(Command::Redo),
                "z" | "Z" => self.apply(Command::Undo),
                "c" | "C" => self.apply(Command::Copy),
                "v" | "V" => self.apply(Command::Paste),
                "d" | "D" => self.apply(Command::Duplicate),
                _ => Vec::new(),
            };
        }
        match name {
            "Escape" => {
                let mut actions = self.cancel_gesture();
                self.ui.selected_id = None;
                self.ui.tool = Tool::Select;
                actions.push(Action::RenderNeeded);
                actions
            }
            "Delete" | "Backspace" => {
                if self.ui.editing_text.is_some() {
                    return Vec::new();
                }
                match self.ui.selected_id {
                    Some(id) => self.apply(Command::Delete(id)),
                    None => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }

    /// The window lost focus: an in-progress drag is implicitly cancelled.
    pub fn on_blur(&mut self) -> Vec<Action> {
        self.cancel_gesture()
    }

    // --- Internals ---

    fn commit(&mut self) {
        self.history.commit(self.doc.clone());
    }

    fn commit_updated(&mut self, id: ShapeId) -> Vec<Action> {
        self.commit();
        let mut actions = match self.doc.get(id) {
            Some(shape) => vec![Action::ShapeUpdated(shape.clone())],
            None => Vec::new(),
        };
        actions.push(Action::RenderNeeded);
        actions
    }

    fn after_history_step(&mut self) -> Vec<Action> {
        self.doc = self.history.present().clone();
        if let Some(id) = self.ui.selected_id {
            if !self.doc.contains(id) {
                self.ui.selected_id = None;
            }
        }
        self.ui.image_status.retain(|id, _| self.doc.contains(*id));

        // A history step can resurrect an image shape whose load state was
        // pruned with it; the host only loads on request.
        let mut actions = Vec::new();
        for shape in self.doc.iter() {
            if let ShapeKind::Image { src, .. } = &shape.kind {
                if !self.ui.image_status.contains_key(&shape.id) {
                    self.ui.image_status.insert(shape.id, ImageStatus::Loading);
                    actions.push(Action::ImageLoadRequested { id: shape.id, src: src.clone() });
                }
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Revert uncommitted transient mutations and drop the gesture.
    fn cancel_gesture(&mut self) -> Vec<Action> {
        if matches!(self.gesture, Gesture::Idle) {
            return Vec::new();
        }
        self.gesture = Gesture::Idle;
        self.doc = self.history.present().clone();
        if let Some(id) = self.ui.selected_id {
            if !self.doc.contains(id) {
                self.ui.selected_id = None;
            }
        }
        self.ui.image_status.retain(|id, _| self.doc.contains(*id));
        vec![Action::RenderNeeded]
    }

    fn insert_uncommitted(&mut self, shape: Shape) -> Vec<Action> {
        let mut actions = Vec::new();
        if let ShapeKind::Image { src, .. } = &shape.kind {
            self.ui.image_status.insert(shape.id, ImageStatus::Loading);
            actions.push(Action::ImageLoadRequested { id: shape.id, src: src.clone() });
        }
        self.ui.selected_id = Some(shape.id);
        self.doc.insert(shape);
        actions
    }

    fn insert_offset_copy(&mut self, source: Shape) -> Vec<Action> {
        let mut copy = source;
        copy.id = uuid::Uuid::new_v4();
        copy.x += DUPLICATE_OFFSET;
        copy.y += DUPLICATE_OFFSET;
        self.apply(Command::Insert(copy))
    }

    fn start_drawing(&mut self, logical: Point) -> Vec<Action> {
        let origin = self.snap_point(logical);
        let shape = shape_for_tool(self.ui.tool, origin);
        let default_size = Point::new(shape.width, shape.height);
        let id = shape.id;

        let mut actions = self.insert_uncommitted(shape);
        // Connectors start as a zero-length segment under the pointer and
        // stretch with the drag.
        if let Some(s) = self.doc.get_mut(id) {
            if s.is_connector() {
                collapse_connector(s);
            }
        }
        self.gesture = Gesture::Drawing { id, anchor: origin, default_size };
        actions.push(Action::RenderNeeded);
        actions
    }

    fn start_gesture_on_hit(&mut self, id: ShapeId, part: HitPart, logical: Point) -> Vec<Action> {
        self.ui.selected_id = Some(id);
        let Some(shape) = self.doc.get(id) else {
            return vec![Action::RenderNeeded];
        };
        let mut actions = Vec::new();
        let mutable = !shape.locked;

        match part {
            HitPart::Body => {
                // An unlinked card opens the entity-link selector on click;
                // the shape is only mutated when the collaborator returns.
                if shape.is_unlinked_card() {
                    actions.push(Action::LinkEntityRequested { id });
                }
                if mutable && shape.draggable {
                    self.gesture = Gesture::Dragging {
                        id,
                        grab_offset: Point::new(logical.x - shape.x, logical.y - shape.y),
                        orig: Point::new(shape.x, shape.y),
                    };
                }
            }
            HitPart::ResizeHandle(anchor) => {
                if mutable {
                    self.gesture = Gesture::Resizing {
                        id,
                        anchor,
                        orig: Point::new(shape.x, shape.y),
                        orig_size: Point::new(shape.width, shape.height),
                    };
                }
            }
            HitPart::RotateHandle => {
                if mutable {
                    let center = shape.center();
                    self.gesture = Gesture::Rotating {
                        id,
                        center,
                        orig_rotation: shape.rotation,
                        start_angle: (logical.y - center.y).atan2(logical.x - center.x),
                    };
                }
            }
            HitPart::EndpointHandle(end) => {
                if mutable {
                    if let Some((a, b)) = shape.endpoints() {
                        let orig = match end {
                            EndpointEnd::A => a,
                            EndpointEnd::B => b,
                        };
                        self.gesture = Gesture::DraggingEndpoint { id, end, orig };
                    }
                }
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    fn mutate_geometry(&mut self, id: ShapeId, f: impl FnOnce(&mut Shape)) -> Vec<Action> {
        let Some(shape) = self.doc.get_mut(id) else {
            return Vec::new();
        };
        if shape.locked {
            return Vec::new();
        }
        f(shape);
        self.commit_updated(id)
    }

    fn mutate_payload(&mut self, id: ShapeId, f: impl FnOnce(&mut Shape) -> bool) -> Vec<Action> {
        let Some(shape) = self.doc.get_mut(id) else {
            return Vec::new();
        };
        if !f(shape) {
            return Vec::new();
        }
        self.commit_updated(id)
    }

    fn hover_cursor(&self, logical: Point) -> Vec<Action> {
        if self.ui.tool.creates_shape() {
            return vec![Action::SetCursor("crosshair".to_owned())];
        }
        let hit = hit::hit_test(
            logical,
            &self.doc,
            self.ui.selected_id,
            self.handle_slop(),
            self.rotate_offset(),
        );
        let cursor = match hit.map(|h| h.part) {
            Some(HitPart::Body) => "move",
            Some(HitPart::ResizeHandle(ResizeAnchor::N | ResizeAnchor::S)) => "ns-resize",
            Some(HitPart::ResizeHandle(ResizeAnchor::E | ResizeAnchor::W)) => "ew-resize",
            Some(HitPart::ResizeHandle(ResizeAnchor::Ne | ResizeAnchor::Sw)) => "nesw-resize",
            Some(HitPart::ResizeHandle(ResizeAnchor::Nw | ResizeAnchor::Se)) => "nwse-resize",
            Some(HitPart::RotateHandle) => "grab",
            Some(HitPart::EndpointHandle(_)) => "crosshair",
            None => "default",
        };
        vec![Action::SetCursor(cursor.to_owned())]
    }

    /// Quantize a coordinate when snap-to-grid is enabled. Applied only to
    /// coordinates being actively dragged, never retroactively.
    fn snap(&self, value: f64) -> f64 {
        if self.settings.snap_enabled {
            quantize(value, self.settings.grid_size)
        } else {
            value
        }
    }

    fn snap_point(&self, pt: Point) -> Point {
        Point::new(self.snap(pt.x), self.snap(pt.y))
    }

    fn handle_slop(&self) -> f64 {
        self.viewport.device_dist_to_logical(self.settings.unit, HANDLE_RADIUS_PX)
    }

    fn rotate_offset(&self) -> f64 {
        self.viewport.device_dist_to_logical(self.settings.unit, ROTATE_HANDLE_OFFSET_PX)
    }
}

// =============================================================
// Geometry application helpers
// =============================================================

fn shape_for_tool(tool: Tool, origin: Point) -> Shape {
    let (x, y) = (origin.x, origin.y);
    match tool {
        // `creates_shape` is false only for Select; a drawing gesture is
        // never started with it.
        Tool::Select | Tool::Rect => Shape::rectangle(x, y),
        Tool::Ellipse => Shape::ellipse(x, y),
        Tool::Text => Shape::text(x, y),
        Tool::Image => Shape::image(x, y, String::new()),
        Tool::Line => Shape::line(x, y),
        Tool::Arrow => Shape::arrow(x, y),
        Tool::Polygon => Shape::pentagon(x, y),
        Tool::DataCard => Shape::data_card(x, y),
        Tool::Mermaid => Shape::mermaid(x, y),
    }
}

fn collapse_connector(shape: &mut Shape) {
    if let ShapeKind::Line { points } | ShapeKind::Arrow { points, .. } = &mut shape.kind {
        *points = [0.0; 4];
        shape.width = 0.0;
        shape.height = 0.0;
    }
}

/// Size a shape being drawn from `anchor` toward the pointer.
fn size_drawing(shape: &mut Shape, anchor: Point, pt: Point) {
    if shape.is_connector() {
        shape.x = anchor.x;
        shape.y = anchor.y;
        if let ShapeKind::Line { points } | ShapeKind::Arrow { points, .. } = &mut shape.kind {
            points[2] = pt.x - anchor.x;
            points[3] = pt.y - anchor.y;
            shape.width = points[2].abs();
            shape.height = points[3].abs();
        }
        return;
    }
    let x = anchor.x.min(pt.x);
    let y = anchor.y.min(pt.y);
    let w = (pt.x - anchor.x).abs();
    let h = (pt.y - anchor.y).abs();
    apply_box(shape, x, y, w, h);
}

/// New bounding box for a resize drag: the anchored edges stay fixed and
/// the dragged edges follow the pointer, clamped so extents never go
/// negative.
fn resized_box(orig: Point, orig_size: Point, anchor: ResizeAnchor, pt: Point) -> (f64, f64, f64, f64) {
    let left = orig.x;
    let top = orig.y;
    let right = orig.x + orig_size.x;
    let bottom = orig.y + orig_size.y;

    let (mut x, mut w) = (left, orig_size.x);
    let (mut y, mut h) = (top, orig_size.y);

    match anchor {
        ResizeAnchor::E | ResizeAnchor::Ne | ResizeAnchor::Se => {
            w = (pt.x - left).max(0.0);
        }
        ResizeAnchor::W | ResizeAnchor::Nw | ResizeAnchor::Sw => {
            x = pt.x.min(right);
            w = right - x;
        }
        ResizeAnchor::N | ResizeAnchor::S => {}
    }
    match anchor {
        ResizeAnchor::S | ResizeAnchor::Se | ResizeAnchor::Sw => {
            h = (pt.y - top).max(0.0);
        }
        ResizeAnchor::N | ResizeAnchor::Ne | ResizeAnchor::Nw => {
            y = pt.y.min(bottom);
            h = bottom - y;
        }
        ResizeAnchor::E | ResizeAnchor::W => {}
    }
    (x, y, w, h)
}

/// Preserve the source aspect ratio for images on corner resizes.
fn constrain_aspect(shape: &Shape, anchor: ResizeAnchor, w: f64, h: f64) -> (f64, f64) {
    let ShapeKind::Image { keep_aspect: true, .. } = &shape.kind else {
        return (w, h);
    };
    let corner = matches!(
        anchor,
        ResizeAnchor::Ne | ResizeAnchor::Se | ResizeAnchor::Sw | ResizeAnchor::Nw
    );
    if !corner || shape.width <= 0.0 || shape.height <= 0.0 {
        return (w, h);
    }
    let ratio = shape.height / shape.width;
    (w, w * ratio)
}

/// Write a new bounding box, scaling polygon vertices with it so the
/// stored points keep filling the box.
fn apply_box(shape: &mut Shape, x: f64, y: f64, w: f64, h: f64) {
    if let ShapeKind::Polygon { points, .. } = &mut shape.kind {
        if shape.width > 0.0 && shape.height > 0.0 {
            let sx = w / shape.width;
            let sy = h / shape.height;
            for (i, v) in points.iter_mut().enumerate() {
                *v *= if i % 2 == 0 { sx } else { sy };
            }
        }
    }
    shape.x = x;
    shape.y = y;
    shape.width = w;
    shape.height = h;
}

fn restore_default_size(shape: &mut Shape, default_size: Point) {
    if shape.is_connector() {
        if let ShapeKind::Line { points } | ShapeKind::Arrow { points, .. } = &mut shape.kind {
            *points = [0.0, 0.0, crate::consts::CONNECTOR_DEFAULT_LENGTH, 0.0];
            shape.width = crate::consts::CONNECTOR_DEFAULT_LENGTH;
            shape.height = 0.0;
        }
        return;
    }
    if let ShapeKind::Polygon { points, .. } = &mut shape.kind {
        // Drawing collapsed the vertices toward zero; rebuild the default
        // inscribed polygon at the current origin.
        let sides = points.len() / 2;
        let rebuilt = Shape::polygon(shape.x, shape.y, sides);
        if let ShapeKind::Polygon { points: fresh, .. } = rebuilt.kind {
            *points = fresh;
        }
    }
    shape.width = default_size.x;
    shape.height = default_size.y;
}

// =============================================================
// Wasm wrapper
// =============================================================

/// The full canvas engine: [`EngineCore`] plus the browser canvas element
/// it renders to.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, settings: CanvasSettings) -> Self {
        Self { canvas, core: EngineCore::with_settings(settings) }
    }

    /// The drawable surface, for the export collaborator to rasterize.
    #[must_use]
    pub fn surface(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Update viewport dimensions and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.viewport_width = width_css;
        self.core.viewport_height = height_css;
        self.core.dpr = dpr;
    }

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a Canvas2D call
    /// fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        render::draw(&ctx, &self.core)
    }
}
