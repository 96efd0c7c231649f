//! Document model: the scene, canvas settings, and the persistence payload.
//!
//! A [`Scene`] is a flat ordered sequence of shapes — array position is the
//! z-order (later = on top) and there are no parent/child or grouping
//! relationships. Scene snapshots taken by the history manager are plain
//! deep clones, so mutating the live scene never aliases a stored snapshot.
//!
//! [`CanvasSettings`] is created once per editor session and mutated only
//! through explicit setters on the engine; it is not versioned by
//! undo/redo. [`DocumentPayload`] is the opaque serializable unit exchanged
//! with the persistence collaborator.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};

use crate::shape::{Shape, ShapeId};
use crate::units::Unit;

/// Whether the canvas is a fixed-size page or grows with its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageMode {
    /// Fixed page extents (e.g. an A4 sheet).
    #[default]
    Page,
    /// Auto-expanding surface for free-form note documents.
    Flexible,
}

/// Per-session canvas configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasSettings {
    /// Logical unit shape geometry is authored in.
    pub unit: Unit,
    /// Page vs flexible surface.
    pub page_mode: PageMode,
    /// Page width in the logical unit.
    pub width: f64,
    /// Page height in the logical unit.
    pub height: f64,
    /// Page background as a CSS color string.
    pub background: String,
    /// Whether grid lines are painted.
    pub grid_enabled: bool,
    /// Grid pitch in the logical unit.
    pub grid_size: f64,
    /// Grid line color as a CSS color string.
    pub grid_color: String,
    /// Whether dragged coordinates snap to the grid.
    pub snap_enabled: bool,
    /// Snap capture distance in the logical unit.
    pub snap_tolerance: f64,
    /// Inner page padding in the logical unit.
    pub padding: f64,
}

impl Default for CanvasSettings {
    /// An A4 portrait page in millimeters with a 5 mm grid and snap on.
    fn default() -> Self {
        Self {
            unit: Unit::Mm,
            page_mode: PageMode::Page,
            width: 210.0,
            height: 297.0,
            background: "#FFFFFF".to_owned(),
            grid_enabled: true,
            grid_size: 5.0,
            grid_color: "#E3E7EE".to_owned(),
            snap_enabled: true,
            snap_tolerance: 2.5,
            padding: 10.0,
        }
    }
}

impl CanvasSettings {
    /// A flexible pixel-unit surface for note documents.
    #[must_use]
    pub fn flexible(width: f64, height: f64) -> Self {
        Self {
            unit: Unit::Px,
            page_mode: PageMode::Flexible,
            width,
            height,
            grid_size: 20.0,
            snap_tolerance: 10.0,
            padding: 0.0,
            ..Self::default()
        }
    }
}

/// The ordered collection of all shapes at a point in time.
///
/// Paint and hit-test order is the array order; [`Scene::insert`] appends,
/// so new shapes land on top.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scene {
    shapes: Vec<Shape>,
}

impl Scene {
    /// An empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A scene over an existing ordered shape list.
    #[must_use]
    pub fn from_shapes(shapes: Vec<Shape>) -> Self {
        debug_assert!(
            {
                let mut ids: Vec<ShapeId> = shapes.iter().map(|s| s.id).collect();
                ids.sort_unstable();
                ids.windows(2).all(|w| w[0] != w[1])
            },
            "scene shapes must have unique ids"
        );
        Self { shapes }
    }

    /// Append a shape at the top of the z-order.
    pub fn insert(&mut self, shape: Shape) {
        debug_assert!(self.index_of(shape.id).is_none(), "duplicate shape id inserted");
        self.shapes.push(shape);
    }

    /// Remove a shape by id, returning it if it was present.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let idx = self.index_of(id)?;
        Some(self.shapes.remove(idx))
    }

    /// Reference to a shape by id.
    #[must_use]
    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    /// Mutable reference to a shape by id.
    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    /// Z-order position of a shape (0 = bottom), if present.
    #[must_use]
    pub fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.shapes.iter().position(|s| s.id == id)
    }

    /// Whether a shape with this id exists.
    #[must_use]
    pub fn contains(&self, id: ShapeId) -> bool {
        self.index_of(id).is_some()
    }

    /// Shapes in z-order, bottom first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Shape> {
        self.shapes.iter()
    }

    /// The ordered shape slice, bottom first.
    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Move a shape to the top of the z-order. No-op if absent.
    pub fn bring_to_front(&mut self, id: ShapeId) {
        if let Some(idx) = self.index_of(id) {
            let shape = self.shapes.remove(idx);
            self.shapes.push(shape);
        }
    }

    /// Move a shape to the bottom of the z-order. No-op if absent.
    pub fn send_to_back(&mut self, id: ShapeId) {
        if let Some(idx) = self.index_of(id) {
            let shape = self.shapes.remove(idx);
            self.shapes.insert(0, shape);
        }
    }

    /// Number of shapes in the scene.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns `true` if the scene contains no shapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// The opaque serializable payload exchanged with the persistence
/// collaborator. No schema validation is performed beyond the shape
/// model's type discrimination.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentPayload {
    /// Canvas configuration for the session.
    pub settings: CanvasSettings,
    /// All shapes in z-order.
    pub shapes: Vec<Shape>,
}

impl DocumentPayload {
    /// Serialize to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `Err` if serialization fails (not expected for this type).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a JSON string produced by [`DocumentPayload::to_json`].
    ///
    /// # Errors
    ///
    /// Returns `Err` if the payload is not a valid document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
