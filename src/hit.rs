//! Hit-testing against scene shapes.
//!
//! All tests run in logical space; the caller converts the pointer to
//! logical coordinates and supplies a logical-space `slop` derived from the
//! device-space handle radius and the current zoom, so handles keep a
//! constant on-screen size.
//!
//! Order of precedence: the selected shape's handles (resize, rotate,
//! connector endpoints) are tested first, then shape bodies topmost-first.
//! Rotation is handled by un-rotating the pointer into shape-local space
//! about the shape center before the per-kind test.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::doc::Scene;
use crate::shape::{EndpointEnd, Shape, ShapeId, ShapeKind};
use crate::units::Point;

/// Which part of a shape was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    /// The shape body.
    Body,
    /// One of the eight resize handles.
    ResizeHandle(ResizeAnchor),
    /// The rotate handle above the bounding box.
    RotateHandle,
    /// A connector endpoint handle.
    EndpointHandle(EndpointEnd),
}

/// Anchor position for resize handles, clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub shape_id: ShapeId,
    pub part: HitPart,
}

/// Test what is under `pt`, checking the selected shape's handles first.
///
/// `slop` is the handle/segment capture radius in logical units.
/// `rotate_offset` is the logical-space distance from the bounding box top
/// edge to the rotate handle.
#[must_use]
pub fn hit_test(
    pt: Point,
    scene: &Scene,
    selected: Option<ShapeId>,
    slop: f64,
    rotate_offset: f64,
) -> Option<Hit> {
    if let Some(id) = selected {
        if let Some(shape) = scene.get(id) {
            if let Some(part) = handle_hit(pt, shape, slop, rotate_offset) {
                return Some(Hit { shape_id: id, part });
            }
        }
    }

    // Bodies, topmost first.
    for shape in scene.iter().rev() {
        if body_hit(pt, shape, slop) {
            return Some(Hit { shape_id: shape.id, part: HitPart::Body });
        }
    }
    None
}

// =============================================================
// Handles
// =============================================================

fn handle_hit(pt: Point, shape: &Shape, slop: f64, rotate_offset: f64) -> Option<HitPart> {
    if shape.is_connector() {
        let (a, b) = shape.endpoints()?;
        if dist(pt, a) <= slop {
            return Some(HitPart::EndpointHandle(EndpointEnd::A));
        }
        if dist(pt, b) <= slop {
            return Some(HitPart::EndpointHandle(EndpointEnd::B));
        }
        return None;
    }

    if shape.locked {
        return None;
    }

    let rotate = rotate_handle_position(shape, rotate_offset);
    if dist(pt, rotate) <= slop {
        return Some(HitPart::RotateHandle);
    }

    let anchors = [
        ResizeAnchor::N,
        ResizeAnchor::Ne,
        ResizeAnchor::E,
        ResizeAnchor::Se,
        ResizeAnchor::S,
        ResizeAnchor::Sw,
        ResizeAnchor::W,
        ResizeAnchor::Nw,
    ];
    for (pos, anchor) in resize_handle_positions(shape).into_iter().zip(anchors) {
        if dist(pt, pos) <= slop {
            return Some(HitPart::ResizeHandle(anchor));
        }
    }
    None
}

/// Positions of the eight resize handles in logical space, in the order
/// N, NE, E, SE, S, SW, W, NW, rotated with the shape.
#[must_use]
pub fn resize_handle_positions(shape: &Shape) -> [Point; 8] {
    let center = shape.center();
    let hw = shape.width / 2.0;
    let hh = shape.height / 2.0;
    let local = [
        Point::new(0.0, -hh),
        Point::new(hw, -hh),
        Point::new(hw, 0.0),
        Point::new(hw, hh),
        Point::new(0.0, hh),
        Point::new(-hw, hh),
        Point::new(-hw, 0.0),
        Point::new(-hw, -hh),
    ];
    local.map(|p| rotate_about(Point::new(center.x + p.x, center.y + p.y), center, shape.rotation))
}

/// Position of the rotate handle: `offset` above the top edge midpoint,
/// rotated with the shape.
#[must_use]
pub fn rotate_handle_position(shape: &Shape, offset: f64) -> Point {
    let center = shape.center();
    let above = Point::new(center.x, shape.y - offset);
    rotate_about(above, center, shape.rotation)
}

// =============================================================
// Bodies
// =============================================================

fn body_hit(pt: Point, shape: &Shape, slop: f64) -> bool {
    if !shape.visible {
        return false;
    }

    if shape.is_connector() {
        let Some((a, b)) = shape.endpoints() else {
            return false;
        };
        return dist_to_segment(pt, a, b) <= shape.stroke_width / 2.0 + slop;
    }

    // Zero-area shapes are permitted in the scene but not pointer-selectable.
    if shape.width <= 0.0 || shape.height <= 0.0 {
        return false;
    }

    let center = shape.center();
    let local = rotate_about(pt, center, -shape.rotation);
    let dx = local.x - center.x;
    let dy = local.y - center.y;
    let hw = shape.width / 2.0;
    let hh = shape.height / 2.0;

    match &shape.kind {
        ShapeKind::Rectangle
        | ShapeKind::Text { .. }
        | ShapeKind::Image { .. }
        | ShapeKind::DataCard { .. }
        | ShapeKind::MermaidDiagram { .. } => dx.abs() <= hw && dy.abs() <= hh,
        // Same averaged-radius circle the renderer draws, so hits and
        // pixels agree.
        ShapeKind::Ellipse => {
            let r = (hw + hh) / 2.0;
            dx.hypot(dy) <= r
        }
        ShapeKind::Polygon { points, closed } => {
            let origin = Point::new(local.x - shape.x, local.y - shape.y);
            if *closed {
                point_in_polygon(origin, points)
            } else {
                near_polyline(origin, points, shape.stroke_width / 2.0 + slop)
            }
        }
        ShapeKind::Line { .. } | ShapeKind::Arrow { .. } => false,
    }
}

// =============================================================
// Geometry helpers
// =============================================================

/// Rotate `pt` around `center` by `degrees` (clockwise positive).
#[must_use]
pub fn rotate_about(pt: Point, center: Point, degrees: f64) -> Point {
    if degrees.abs() < 1e-9 {
        return pt;
    }
    let rad = degrees.to_radians();
    let (sin, cos) = rad.sin_cos();
    let dx = pt.x - center.x;
    let dy = pt.y - center.y;
    Point::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
}

fn dist(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Distance from `pt` to the segment `a`-`b`.
#[must_use]
pub fn dist_to_segment(pt: Point, a: Point, b: Point) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq <= f64::EPSILON {
        return dist(pt, a);
    }
    let t = ((pt.x - a.x) * abx + (pt.y - a.y) * aby) / len_sq;
    let t = t.clamp(0.0, 1.0);
    dist(pt, Point::new(a.x + t * abx, a.y + t * aby))
}

/// Even-odd point-in-polygon test over flat `[x0, y0, x1, y1, ...]` pairs.
fn point_in_polygon(pt: Point, points: &[f64]) -> bool {
    let n = points.len() / 2;
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (points[i * 2], points[i * 2 + 1]);
        let (xj, yj) = (points[j * 2], points[j * 2 + 1]);
        if (yi > pt.y) != (yj > pt.y) {
            let x_cross = (xj - xi) * (pt.y - yi) / (yj - yi) + xi;
            if pt.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Whether `pt` is within `tolerance` of any open-polyline segment.
fn near_polyline(pt: Point, points: &[f64], tolerance: f64) -> bool {
    let n = points.len() / 2;
    if n < 2 {
        return false;
    }
    (1..n).any(|i| {
        let a = Point::new(points[(i - 1) * 2], points[(i - 1) * 2 + 1]);
        let b = Point::new(points[i * 2], points[i * 2 + 1]);
        dist_to_segment(pt, a, b) <= tolerance
    })
}
