//! Shape model: the typed records that can be placed on the canvas.
//!
//! A [`Shape`] is a flat base record (identity, bounding box, paint
//! attributes, interaction gates) plus a closed [`ShapeKind`] payload, one
//! variant per placeable kind. Every consumer (renderer, hit-tester,
//! reducer, serializer) matches `ShapeKind` exhaustively, so adding a kind
//! is a compile-time-checked exercise.
//!
//! Shapes are pure data. The only behavior here is the set of constructors
//! that populate type-correct defaults: each variant's defaults are total,
//! never leaving a required payload field undefined.

#[cfg(test)]
#[path = "shape_test.rs"]
mod shape_test;

use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{
    ARROW_HEAD_LENGTH, ARROW_HEAD_WIDTH, CONNECTOR_DEFAULT_LENGTH, POLYGON_DEFAULT_RADIUS,
    POLYGON_DEFAULT_SIDES, TEXT_DEFAULT_FONT_SIZE, TEXT_DEFAULT_HEIGHT, TEXT_DEFAULT_WIDTH,
};
use crate::units::Point;

/// Unique identifier for a shape, stable for the lifetime of the scene.
pub type ShapeId = Uuid;

/// Which end of a line or arrow segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointEnd {
    /// The segment start, `points[0..2]`.
    A,
    /// The segment end, `points[2..4]`.
    B,
}

/// Display configuration for a data-card shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDisplay {
    /// Card background as a CSS color string.
    pub background: String,
    /// Card border as a CSS color string.
    pub border: String,
    /// Corner radius in logical units.
    pub corner_radius: f64,
    /// Whether the entity-kind icon is shown.
    pub show_icon: bool,
}

impl Default for CardDisplay {
    fn default() -> Self {
        Self {
            background: "#FFFFFF".to_owned(),
            border: "#D0D4DC".to_owned(),
            corner_radius: 8.0,
            show_icon: true,
        }
    }
}

/// Type-specific payload of a shape. Tagged `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ShapeKind {
    /// Axis-aligned rectangle.
    Rectangle,
    /// Ellipse inscribed within the bounding box. Rendered and hit-tested as
    /// a circle whose radius is the average of half-width and half-height.
    Ellipse,
    /// A block of text.
    Text {
        /// Text content, possibly multi-line.
        content: String,
        /// CSS font family.
        font_family: String,
        /// Font size in points.
        font_size: f64,
    },
    /// A raster image loaded from a source reference. Load state is
    /// ephemeral UI state, never stored on the shape.
    Image {
        /// Source reference (URL).
        src: String,
        /// Preserve the source aspect ratio when resizing.
        keep_aspect: bool,
    },
    /// A single straight segment relative to the shape origin.
    Line {
        /// `[x0, y0, x1, y1]` in logical units, relative to `(x, y)`.
        points: [f64; 4],
    },
    /// A single directed segment with an arrowhead at the B end.
    Arrow {
        /// `[x0, y0, x1, y1]` in logical units, relative to `(x, y)`.
        points: [f64; 4],
        /// Arrowhead length along the segment, in logical units.
        head_length: f64,
        /// Arrowhead width across the segment, in logical units.
        head_width: f64,
    },
    /// An ordered point sequence, optionally closed.
    Polygon {
        /// Flat `[x0, y0, x1, y1, ...]` pairs relative to `(x, y)`.
        points: Vec<f64>,
        /// Whether the last point connects back to the first.
        closed: bool,
    },
    /// A card referencing an entity in an external domain store.
    DataCard {
        /// Entity kind in the external store (e.g. `"project"`, `"note"`).
        data_kind: String,
        /// Entity id; empty means the card is unlinked and must render
        /// visually distinct.
        data_id: String,
        /// Cached display name written back by the entity-link collaborator.
        display_name: String,
        /// Visual configuration.
        display: CardDisplay,
    },
    /// Mermaid diagram source. The shape stores only the text; rendering is
    /// delegated to an external collaborator.
    MermaidDiagram {
        /// Diagram source text, written back verbatim by the editor
        /// collaborator.
        source: String,
    },
}

impl ShapeKind {
    /// The wire tag of this kind.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Line { .. } => "line",
            Self::Arrow { .. } => "arrow",
            Self::Polygon { .. } => "polygon",
            Self::DataCard { .. } => "data-card",
            Self::MermaidDiagram { .. } => "mermaid-diagram",
        }
    }
}

/// A placeable element of the scene.
///
/// `x`/`y` are the top-left origin of the bounding box in the document's
/// logical unit; `width`/`height` are non-negative extents; `rotation` is
/// clockwise degrees about the bounding-box center. Paint order is the
/// shape's position in the scene's array (later = on top).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Stable unique identity.
    pub id: ShapeId,
    /// Left edge of the bounding box, logical units.
    pub x: f64,
    /// Top edge of the bounding box, logical units.
    pub y: f64,
    /// Bounding box width, `>= 0`.
    pub width: f64,
    /// Bounding box height, `>= 0`.
    pub height: f64,
    /// Clockwise rotation in degrees about the center.
    #[serde(default)]
    pub rotation: f64,
    /// Whether pointer drags may move the shape.
    #[serde(default = "default_true")]
    pub draggable: bool,
    /// A locked shape can be selected but never mutated by gestures.
    #[serde(default)]
    pub locked: bool,
    /// Invisible shapes are neither painted nor hit-testable.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Fill color as a CSS color string.
    pub fill: String,
    /// Stroke color as a CSS color string.
    pub stroke: String,
    /// Stroke width in logical units.
    pub stroke_width: f64,
    /// Type-specific payload.
    #[serde(flatten)]
    pub kind: ShapeKind,
}

fn default_true() -> bool {
    true
}

impl Shape {
    fn base(x: f64, y: f64, width: f64, height: f64, kind: ShapeKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            width,
            height,
            rotation: 0.0,
            draggable: true,
            locked: false,
            visible: true,
            fill: "#E8EDF4".to_owned(),
            stroke: "#3B4252".to_owned(),
            stroke_width: 1.0,
            kind,
        }
    }

    /// A new 100x80 rectangle at `(x, y)`.
    #[must_use]
    pub fn rectangle(x: f64, y: f64) -> Self {
        Self::base(x, y, 100.0, 80.0, ShapeKind::Rectangle)
    }

    /// A new 100x100 ellipse at `(x, y)`.
    #[must_use]
    pub fn ellipse(x: f64, y: f64) -> Self {
        Self::base(x, y, 100.0, 100.0, ShapeKind::Ellipse)
    }

    /// A new empty text block at `(x, y)`: 200x50 logical units, 16pt.
    #[must_use]
    pub fn text(x: f64, y: f64) -> Self {
        let mut shape = Self::base(
            x,
            y,
            TEXT_DEFAULT_WIDTH,
            TEXT_DEFAULT_HEIGHT,
            ShapeKind::Text {
                content: String::new(),
                font_family: "sans-serif".to_owned(),
                font_size: TEXT_DEFAULT_FONT_SIZE,
            },
        );
        shape.fill = "#1F2430".to_owned();
        shape
    }

    /// A new 150x150 image at `(x, y)` backed by `src`, aspect preserved.
    #[must_use]
    pub fn image(x: f64, y: f64, src: impl Into<String>) -> Self {
        Self::base(x, y, 150.0, 150.0, ShapeKind::Image { src: src.into(), keep_aspect: true })
    }

    /// A new horizontal line at `(x, y)`: segment `[0, 0, 100, 0]`.
    #[must_use]
    pub fn line(x: f64, y: f64) -> Self {
        Self::base(
            x,
            y,
            CONNECTOR_DEFAULT_LENGTH,
            0.0,
            ShapeKind::Line { points: [0.0, 0.0, CONNECTOR_DEFAULT_LENGTH, 0.0] },
        )
    }

    /// A new horizontal arrow at `(x, y)` with the default head.
    #[must_use]
    pub fn arrow(x: f64, y: f64) -> Self {
        Self::base(
            x,
            y,
            CONNECTOR_DEFAULT_LENGTH,
            0.0,
            ShapeKind::Arrow {
                points: [0.0, 0.0, CONNECTOR_DEFAULT_LENGTH, 0.0],
                head_length: ARROW_HEAD_LENGTH,
                head_width: ARROW_HEAD_WIDTH,
            },
        )
    }

    /// A new regular polygon at `(x, y)` with `sides` vertices, inscribed in
    /// a radius-50 circle centered on the bounding box.
    ///
    /// Vertex `i` sits at angle `i * 2π / sides − π/2`, so the first vertex
    /// points straight up. Fewer than 3 sides falls back to the default
    /// pentagon.
    #[must_use]
    pub fn polygon(x: f64, y: f64, sides: usize) -> Self {
        let sides = if sides < 3 { POLYGON_DEFAULT_SIDES } else { sides };
        let r = POLYGON_DEFAULT_RADIUS;
        let mut points = Vec::with_capacity(sides * 2);
        for i in 0..sides {
            #[allow(clippy::cast_precision_loss)]
            let angle = (i as f64) * TAU / (sides as f64) - FRAC_PI_2;
            points.push(r + r * angle.cos());
            points.push(r + r * angle.sin());
        }
        Self::base(x, y, r * 2.0, r * 2.0, ShapeKind::Polygon { points, closed: true })
    }

    /// A new default pentagon at `(x, y)`.
    #[must_use]
    pub fn pentagon(x: f64, y: f64) -> Self {
        Self::polygon(x, y, POLYGON_DEFAULT_SIDES)
    }

    /// A new 220x120 unlinked data-card at `(x, y)`.
    #[must_use]
    pub fn data_card(x: f64, y: f64) -> Self {
        Self::base(
            x,
            y,
            220.0,
            120.0,
            ShapeKind::DataCard {
                data_kind: String::new(),
                data_id: String::new(),
                display_name: String::new(),
                display: CardDisplay::default(),
            },
        )
    }

    /// A new 240x160 mermaid-diagram shape at `(x, y)` with a minimal source.
    #[must_use]
    pub fn mermaid(x: f64, y: f64) -> Self {
        Self::base(
            x,
            y,
            240.0,
            160.0,
            ShapeKind::MermaidDiagram { source: "graph TD\n  A --> B".to_owned() },
        )
    }

    /// Center of the bounding box.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether this shape is a line or arrow connector.
    #[must_use]
    pub fn is_connector(&self) -> bool {
        matches!(self.kind, ShapeKind::Line { .. } | ShapeKind::Arrow { .. })
    }

    /// The connector segment endpoints in absolute logical coordinates, if
    /// this shape is a line or arrow.
    #[must_use]
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        let points = match &self.kind {
            ShapeKind::Line { points } | ShapeKind::Arrow { points, .. } => points,
            _ => return None,
        };
        Some((
            Point::new(self.x + points[0], self.y + points[1]),
            Point::new(self.x + points[2], self.y + points[3]),
        ))
    }

    /// Set one connector endpoint in absolute logical coordinates, leaving
    /// the shape origin fixed. No-op for non-connector kinds.
    pub fn set_endpoint(&mut self, end: EndpointEnd, pt: Point) {
        let (ox, oy) = (self.x, self.y);
        let points = match &mut self.kind {
            ShapeKind::Line { points } | ShapeKind::Arrow { points, .. } => points,
            _ => return,
        };
        match end {
            EndpointEnd::A => {
                points[0] = pt.x - ox;
                points[1] = pt.y - oy;
            }
            EndpointEnd::B => {
                points[2] = pt.x - ox;
                points[3] = pt.y - oy;
            }
        }
    }

    /// Whether an unlinked entity reference should be indicated for this
    /// shape (data-card with an empty `data_id`).
    #[must_use]
    pub fn is_unlinked_card(&self) -> bool {
        matches!(&self.kind, ShapeKind::DataCard { data_id, .. } if data_id.is_empty())
    }
}
