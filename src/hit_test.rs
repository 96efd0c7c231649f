#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::shape::ShapeKind;

const SLOP: f64 = 8.0;
const ROTATE_OFFSET: f64 = 24.0;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn scene_of(shapes: Vec<Shape>) -> Scene {
    Scene::from_shapes(shapes)
}

fn test_hit(pt_: Point, scene: &Scene, selected: Option<ShapeId>) -> Option<Hit> {
    hit_test(pt_, scene, selected, SLOP, ROTATE_OFFSET)
}

// =============================================================
// Bodies
// =============================================================

#[test]
fn rect_body_hit_inside() {
    let scene = scene_of(vec![Shape::rectangle(100.0, 100.0)]);
    let hit = test_hit(pt(150.0, 140.0), &scene, None).unwrap();
    assert_eq!(hit.part, HitPart::Body);
}

#[test]
fn rect_body_miss_outside() {
    let scene = scene_of(vec![Shape::rectangle(100.0, 100.0)]);
    assert!(test_hit(pt(50.0, 50.0), &scene, None).is_none());
}

#[test]
fn empty_background_is_no_hit() {
    let scene = Scene::new();
    assert!(test_hit(pt(0.0, 0.0), &scene, None).is_none());
}

#[test]
fn topmost_shape_wins() {
    let bottom = Shape::rectangle(0.0, 0.0);
    let top = Shape::rectangle(50.0, 40.0);
    let top_id = top.id;
    let scene = scene_of(vec![bottom, top]);
    // (60, 50) is inside both; the later array entry is on top.
    let hit = test_hit(pt(60.0, 50.0), &scene, None).unwrap();
    assert_eq!(hit.shape_id, top_id);
}

#[test]
fn invisible_shape_not_hit() {
    let mut shape = Shape::rectangle(0.0, 0.0);
    shape.visible = false;
    let scene = scene_of(vec![shape]);
    assert!(test_hit(pt(50.0, 40.0), &scene, None).is_none());
}

#[test]
fn zero_area_shape_not_hit() {
    let mut shape = Shape::rectangle(50.0, 50.0);
    shape.width = 0.0;
    shape.height = 0.0;
    let scene = scene_of(vec![shape]);
    assert!(test_hit(pt(50.0, 50.0), &scene, None).is_none());
}

#[test]
fn ellipse_uses_averaged_radius_not_bbox() {
    // 100x50 ellipse: averaged radius is (50 + 25) / 2 = 37.5.
    let mut shape = Shape::ellipse(0.0, 0.0);
    shape.width = 100.0;
    shape.height = 50.0;
    let scene = scene_of(vec![shape]);
    // Inside the bbox but outside the averaged circle.
    assert!(test_hit(pt(95.0, 25.0), &scene, None).is_none());
    // Inside the averaged circle.
    assert!(test_hit(pt(85.0, 25.0), &scene, None).is_some());
}

#[test]
fn rotated_rect_hits_in_rotated_space() {
    // 100x20 bar rotated 90 degrees: occupies a vertical strip around its
    // center (50, 10).
    let mut shape = Shape::rectangle(0.0, 0.0);
    shape.height = 20.0;
    shape.rotation = 90.0;
    let scene = scene_of(vec![shape]);
    assert!(test_hit(pt(50.0, 50.0), &scene, None).is_some());
    assert!(test_hit(pt(90.0, 10.0), &scene, None).is_none());
}

#[test]
fn line_hit_within_slop() {
    let scene = scene_of(vec![Shape::line(0.0, 100.0)]);
    assert!(test_hit(pt(50.0, 104.0), &scene, None).is_some());
    assert!(test_hit(pt(50.0, 120.0), &scene, None).is_none());
}

#[test]
fn line_hit_beyond_endpoint_misses() {
    let scene = scene_of(vec![Shape::line(0.0, 100.0)]);
    assert!(test_hit(pt(130.0, 100.0), &scene, None).is_none());
}

#[test]
fn closed_polygon_contains_center() {
    let shape = Shape::pentagon(0.0, 0.0);
    let scene = scene_of(vec![shape]);
    assert!(test_hit(pt(50.0, 50.0), &scene, None).is_some());
}

#[test]
fn closed_polygon_excludes_bbox_corner() {
    let shape = Shape::pentagon(0.0, 0.0);
    let scene = scene_of(vec![shape]);
    // The bbox corner is outside the inscribed pentagon.
    assert!(test_hit(pt(2.0, 2.0), &scene, None).is_none());
}

#[test]
fn open_polygon_hits_near_its_path() {
    let mut shape = Shape::pentagon(0.0, 0.0);
    if let ShapeKind::Polygon { closed, .. } = &mut shape.kind {
        *closed = false;
    }
    let scene = scene_of(vec![shape.clone()]);
    // The first vertex sits at (50, 0) relative to origin.
    assert!(test_hit(pt(50.0, 2.0), &scene, None).is_some());
    // Center is far from every edge.
    assert!(test_hit(pt(50.0, 50.0), &scene, None).is_none());
}

#[test]
fn data_card_and_diagram_hit_as_boxes() {
    let card = Shape::data_card(0.0, 0.0);
    let diagram = Shape::mermaid(300.0, 0.0);
    let card_id = card.id;
    let diagram_id = diagram.id;
    let scene = scene_of(vec![card, diagram]);
    assert_eq!(test_hit(pt(100.0, 60.0), &scene, None).unwrap().shape_id, card_id);
    assert_eq!(test_hit(pt(400.0, 80.0), &scene, None).unwrap().shape_id, diagram_id);
}

// =============================================================
// Handles
// =============================================================

#[test]
fn handles_only_tested_for_selection() {
    let shape = Shape::rectangle(100.0, 100.0);
    let id = shape.id;
    let scene = scene_of(vec![shape]);
    // Corner point: a resize handle when selected, a body hit otherwise.
    let unselected = test_hit(pt(100.0, 100.0), &scene, None).unwrap();
    assert_eq!(unselected.part, HitPart::Body);
    let selected = test_hit(pt(100.0, 100.0), &scene, Some(id)).unwrap();
    assert_eq!(selected.part, HitPart::ResizeHandle(ResizeAnchor::Nw));
}

#[test]
fn all_eight_resize_anchors_resolve() {
    let shape = Shape::rectangle(0.0, 0.0);
    let id = shape.id;
    let scene = scene_of(vec![shape]);
    let cases = [
        (pt(50.0, 0.0), ResizeAnchor::N),
        (pt(100.0, 0.0), ResizeAnchor::Ne),
        (pt(100.0, 40.0), ResizeAnchor::E),
        (pt(100.0, 80.0), ResizeAnchor::Se),
        (pt(50.0, 80.0), ResizeAnchor::S),
        (pt(0.0, 80.0), ResizeAnchor::Sw),
        (pt(0.0, 40.0), ResizeAnchor::W),
        (pt(0.0, 0.0), ResizeAnchor::Nw),
    ];
    for (point, anchor) in cases {
        let hit = test_hit(point, &scene, Some(id)).unwrap();
        assert_eq!(hit.part, HitPart::ResizeHandle(anchor));
    }
}

#[test]
fn rotate_handle_above_top_edge() {
    let shape = Shape::rectangle(0.0, 0.0);
    let id = shape.id;
    let scene = scene_of(vec![shape]);
    let hit = test_hit(pt(50.0, -ROTATE_OFFSET), &scene, Some(id)).unwrap();
    assert_eq!(hit.part, HitPart::RotateHandle);
}

#[test]
fn connector_endpoints_are_handles() {
    let line = Shape::line(10.0, 20.0);
    let id = line.id;
    let scene = scene_of(vec![line]);
    let a = test_hit(pt(10.0, 20.0), &scene, Some(id)).unwrap();
    assert_eq!(a.part, HitPart::EndpointHandle(EndpointEnd::A));
    let b = test_hit(pt(110.0, 20.0), &scene, Some(id)).unwrap();
    assert_eq!(b.part, HitPart::EndpointHandle(EndpointEnd::B));
}

#[test]
fn connector_has_no_resize_or_rotate_handles() {
    let line = Shape::line(0.0, 100.0);
    let id = line.id;
    let scene = scene_of(vec![line]);
    // Above the segment midpoint, where a rotate handle would sit.
    let hit = test_hit(pt(50.0, 100.0 - ROTATE_OFFSET), &scene, Some(id));
    assert!(hit.is_none());
}

#[test]
fn locked_shape_has_no_handles_but_a_body() {
    let mut shape = Shape::rectangle(0.0, 0.0);
    shape.locked = true;
    let id = shape.id;
    let scene = scene_of(vec![shape]);
    let corner = test_hit(pt(0.0, 0.0), &scene, Some(id)).unwrap();
    assert_eq!(corner.part, HitPart::Body);
}

#[test]
fn handle_positions_rotate_with_the_shape() {
    let mut shape = Shape::rectangle(0.0, 0.0);
    shape.rotation = 180.0;
    let handles = resize_handle_positions(&shape);
    // North handle of a 100x80 rect flipped to the bottom edge.
    assert!((handles[0].x - 50.0).abs() < 1e-9);
    assert!((handles[0].y - 80.0).abs() < 1e-9);
}

// =============================================================
// Geometry helpers
// =============================================================

#[test]
fn rotate_about_quarter_turn() {
    let p = rotate_about(Point::new(10.0, 0.0), Point::new(0.0, 0.0), 90.0);
    assert!((p.x - 0.0).abs() < 1e-9);
    assert!((p.y - 10.0).abs() < 1e-9);
}

#[test]
fn rotate_about_zero_is_identity() {
    let p = rotate_about(Point::new(3.0, 4.0), Point::new(1.0, 1.0), 0.0);
    assert_eq!(p, Point::new(3.0, 4.0));
}

#[test]
fn dist_to_segment_interior_and_ends() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(10.0, 0.0);
    assert!((dist_to_segment(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-9);
    assert!((dist_to_segment(Point::new(-4.0, 0.0), a, b) - 4.0).abs() < 1e-9);
    assert!((dist_to_segment(Point::new(13.0, 4.0), a, b) - 5.0).abs() < 1e-9);
}

#[test]
fn dist_to_degenerate_segment() {
    let a = Point::new(2.0, 2.0);
    assert!((dist_to_segment(Point::new(5.0, 6.0), a, a) - 5.0).abs() < 1e-9);
}
