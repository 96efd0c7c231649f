#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use std::f64::consts::FRAC_PI_2;

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

// =============================================================
// Constructor defaults are total
// =============================================================

#[test]
fn rectangle_defaults() {
    let s = Shape::rectangle(10.0, 20.0);
    assert_eq!(s.x, 10.0);
    assert_eq!(s.y, 20.0);
    assert_eq!(s.width, 100.0);
    assert_eq!(s.height, 80.0);
    assert_eq!(s.rotation, 0.0);
    assert!(s.draggable);
    assert!(!s.locked);
    assert!(s.visible);
    assert_eq!(s.kind, ShapeKind::Rectangle);
}

#[test]
fn ellipse_defaults() {
    let s = Shape::ellipse(0.0, 0.0);
    assert_eq!(s.width, 100.0);
    assert_eq!(s.height, 100.0);
    assert_eq!(s.kind, ShapeKind::Ellipse);
}

#[test]
fn text_defaults_are_200_by_50_at_16pt() {
    let s = Shape::text(5.0, 5.0);
    assert_eq!(s.width, 200.0);
    assert_eq!(s.height, 50.0);
    let ShapeKind::Text { content, font_family, font_size } = &s.kind else {
        panic!("expected text kind");
    };
    assert!(content.is_empty());
    assert_eq!(font_family, "sans-serif");
    assert_eq!(*font_size, 16.0);
}

#[test]
fn image_defaults_keep_aspect() {
    let s = Shape::image(0.0, 0.0, "http://example/pic.png");
    let ShapeKind::Image { src, keep_aspect } = &s.kind else {
        panic!("expected image kind");
    };
    assert_eq!(src, "http://example/pic.png");
    assert!(keep_aspect);
}

#[test]
fn line_default_segment_is_horizontal_100() {
    let s = Shape::line(3.0, 4.0);
    let ShapeKind::Line { points } = s.kind else {
        panic!("expected line kind");
    };
    assert_eq!(points, [0.0, 0.0, 100.0, 0.0]);
}

#[test]
fn arrow_default_head() {
    let s = Shape::arrow(0.0, 0.0);
    let ShapeKind::Arrow { points, head_length, head_width } = s.kind else {
        panic!("expected arrow kind");
    };
    assert_eq!(points, [0.0, 0.0, 100.0, 0.0]);
    assert_eq!(head_length, 10.0);
    assert_eq!(head_width, 10.0);
}

#[test]
fn data_card_starts_unlinked() {
    let s = Shape::data_card(0.0, 0.0);
    assert!(s.is_unlinked_card());
    let ShapeKind::DataCard { data_kind, data_id, display, .. } = &s.kind else {
        panic!("expected data-card kind");
    };
    assert!(data_kind.is_empty());
    assert!(data_id.is_empty());
    assert!(display.show_icon);
}

#[test]
fn mermaid_default_source_is_nonempty() {
    let s = Shape::mermaid(0.0, 0.0);
    let ShapeKind::MermaidDiagram { source } = &s.kind else {
        panic!("expected mermaid-diagram kind");
    };
    assert!(source.starts_with("graph"));
}

#[test]
fn constructors_produce_unique_ids() {
    let a = Shape::rectangle(0.0, 0.0);
    let b = Shape::rectangle(0.0, 0.0);
    assert_ne!(a.id, b.id);
}

// =============================================================
// Polygon defaults
// =============================================================

#[test]
fn default_pentagon_has_five_point_pairs() {
    let s = Shape::pentagon(0.0, 0.0);
    let ShapeKind::Polygon { points, closed } = &s.kind else {
        panic!("expected polygon kind");
    };
    assert_eq!(points.len(), 10);
    assert!(closed);
}

#[test]
fn pentagon_first_vertex_points_up_at_radius_50() {
    let s = Shape::pentagon(0.0, 0.0);
    let ShapeKind::Polygon { points, .. } = &s.kind else {
        panic!("expected polygon kind");
    };
    // Center of the inscribing circle is (50, 50); angle -pi/2 is straight up.
    let (cx, cy) = (50.0, 50.0);
    assert!(approx_eq(points[0] - cx, 50.0 * (-FRAC_PI_2).cos()));
    assert!(approx_eq(points[1] - cy, 50.0 * (-FRAC_PI_2).sin()));
}

#[test]
fn pentagon_all_vertices_at_radius_50() {
    let s = Shape::pentagon(0.0, 0.0);
    let ShapeKind::Polygon { points, .. } = &s.kind else {
        panic!("expected polygon kind");
    };
    for i in 0..5 {
        let dx = points[i * 2] - 50.0;
        let dy = points[i * 2 + 1] - 50.0;
        assert!(approx_eq(dx.hypot(dy), 50.0), "vertex {i}");
    }
}

#[test]
fn polygon_under_three_sides_falls_back_to_pentagon() {
    let s = Shape::polygon(0.0, 0.0, 2);
    let ShapeKind::Polygon { points, .. } = &s.kind else {
        panic!("expected polygon kind");
    };
    assert_eq!(points.len(), 10);
}

#[test]
fn hexagon_has_six_pairs() {
    let s = Shape::polygon(0.0, 0.0, 6);
    let ShapeKind::Polygon { points, .. } = &s.kind else {
        panic!("expected polygon kind");
    };
    assert_eq!(points.len(), 12);
}

// =============================================================
// Geometry helpers
// =============================================================

#[test]
fn center_is_bounding_box_middle() {
    let s = Shape::rectangle(10.0, 20.0);
    let c = s.center();
    assert_eq!(c.x, 60.0);
    assert_eq!(c.y, 60.0);
}

#[test]
fn connectors_are_connectors() {
    assert!(Shape::line(0.0, 0.0).is_connector());
    assert!(Shape::arrow(0.0, 0.0).is_connector());
    assert!(!Shape::rectangle(0.0, 0.0).is_connector());
    assert!(!Shape::pentagon(0.0, 0.0).is_connector());
}

#[test]
fn endpoints_are_absolute() {
    let s = Shape::line(10.0, 20.0);
    let (a, b) = s.endpoints().unwrap();
    assert_eq!((a.x, a.y), (10.0, 20.0));
    assert_eq!((b.x, b.y), (110.0, 20.0));
}

#[test]
fn endpoints_none_for_nodes() {
    assert!(Shape::rectangle(0.0, 0.0).endpoints().is_none());
}

#[test]
fn set_endpoint_moves_only_that_end() {
    let mut s = Shape::line(10.0, 20.0);
    s.set_endpoint(EndpointEnd::B, crate::units::Point::new(90.0, 40.0));
    let ShapeKind::Line { points } = s.kind else {
        panic!("expected line kind");
    };
    assert_eq!(points, [0.0, 0.0, 80.0, 20.0]);
}

#[test]
fn set_endpoint_leaves_origin_fixed() {
    let mut s = Shape::line(10.0, 20.0);
    s.set_endpoint(EndpointEnd::A, crate::units::Point::new(0.0, 0.0));
    assert_eq!(s.x, 10.0);
    assert_eq!(s.y, 20.0);
}

#[test]
fn set_endpoint_is_noop_on_nodes() {
    let mut s = Shape::rectangle(10.0, 20.0);
    let before = s.clone();
    s.set_endpoint(EndpointEnd::A, crate::units::Point::new(0.0, 0.0));
    assert_eq!(s, before);
}

// =============================================================
// Wire format
// =============================================================

#[test]
fn kind_tags() {
    assert_eq!(Shape::rectangle(0.0, 0.0).kind.tag(), "rectangle");
    assert_eq!(Shape::data_card(0.0, 0.0).kind.tag(), "data-card");
    assert_eq!(Shape::mermaid(0.0, 0.0).kind.tag(), "mermaid-diagram");
}

#[test]
fn serialized_shape_carries_kebab_case_type_tag() {
    let json = serde_json::to_value(Shape::mermaid(0.0, 0.0)).unwrap();
    assert_eq!(json["type"], "mermaid-diagram");
}

#[test]
fn shape_round_trips_through_json() {
    let original = Shape::arrow(5.0, 6.0);
    let json = serde_json::to_string(&original).unwrap();
    let back: Shape = serde_json::from_str(&json).unwrap();
    assert_eq!(back, original);
}

#[test]
fn polygon_round_trips_through_json() {
    let original = Shape::polygon(1.0, 2.0, 7);
    let json = serde_json::to_string(&original).unwrap();
    let back: Shape = serde_json::from_str(&json).unwrap();
    assert_eq!(back, original);
}

#[test]
fn unknown_type_tag_fails_to_parse() {
    let json = r##"{"id":"8f8aa5c2-3a51-4f27-9f5e-2f0f8f8aa5c2","x":0,"y":0,
        "width":10,"height":10,"fill":"#fff","stroke":"#000","stroke_width":1,
        "type":"blob"}"##;
    assert!(serde_json::from_str::<Shape>(json).is_err());
}

#[test]
fn linked_card_is_not_unlinked() {
    let mut s = Shape::data_card(0.0, 0.0);
    if let ShapeKind::DataCard { data_id, .. } = &mut s.kind {
        *data_id = "proj-17".to_owned();
    }
    assert!(!s.is_unlinked_card());
}
