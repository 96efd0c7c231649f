//! Rendering: shape → drawable mapping and the Canvas2D painter.
//!
//! The mapping layer ([`scene_drawables`]) is pure: every drawable is
//! derived only from a shape's stored fields and the ephemeral image load
//! state, so repeated renders of an unchanged scene are pixel-identical.
//! The painter ([`draw`]) is the only place that touches
//! [`web_sys::CanvasRenderingContext2d`]; it consumes the drawable list
//! plus settings and selection state and produces pixels, mutating nothing.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`;
//! the top-level caller ([`crate::engine::Engine::render`]) handles the
//! result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::consts::{HANDLE_RADIUS_PX, ROTATE_HANDLE_OFFSET_PX};
use crate::doc::Scene;
use crate::engine::EngineCore;
use crate::hit;
use crate::input::{ImageStatus, UiState};
use crate::shape::{Shape, ShapeId, ShapeKind};
use crate::units::Point;

/// Selection accent color.
const SELECTION_COLOR: &str = "#1E90FF";

/// Selection dash segment length in device pixels.
const SELECTION_DASH_PX: f64 = 4.0;

/// A paint-ready primitive in logical coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Axis-aligned rectangle (before drawable rotation).
    Rect { x: f64, y: f64, width: f64, height: f64, corner_radius: f64 },
    /// Circle.
    Circle { cx: f64, cy: f64, r: f64 },
    /// Straight segment between two absolute points.
    Segment { x0: f64, y0: f64, x1: f64, y1: f64 },
    /// Absolute flat point pairs, optionally closed into a filled path.
    PolyLine { points: Vec<f64>, closed: bool },
    /// A block of text anchored at its top-left corner.
    Glyphs { x: f64, y: f64, content: String, font_family: String, font_size: f64 },
}

/// One paintable unit derived from a shape.
///
/// `rotation` is applied by the painter about `center`; geometry inside
/// `prim` stays unrotated so the mapping is trivially comparable in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    /// Shape this drawable was derived from.
    pub shape_id: ShapeId,
    /// Rotation pivot, logical space.
    pub center: Point,
    /// Clockwise rotation in degrees.
    pub rotation: f64,
    /// Fill color, if the primitive is filled.
    pub fill: Option<String>,
    /// Stroke color, if the primitive is stroked.
    pub stroke: Option<String>,
    /// Stroke width in logical units.
    pub stroke_width: f64,
    /// Dash segment length in logical units; `None` paints solid.
    pub dash: Option<f64>,
    /// The geometry to paint.
    pub prim: Primitive,
}

impl Drawable {
    fn of(shape: &Shape, prim: Primitive) -> Self {
        Self {
            shape_id: shape.id,
            center: shape.center(),
            rotation: shape.rotation,
            fill: Some(shape.fill.clone()),
            stroke: Some(shape.stroke.clone()),
            stroke_width: shape.stroke_width,
            dash: None,
            prim,
        }
    }
}

// =============================================================
// Mapping contract
// =============================================================

/// Map the whole scene to drawables in paint order (bottom first).
#[must_use]
pub fn scene_drawables(scene: &Scene, ui: &UiState) -> Vec<Drawable> {
    let mut out = Vec::new();
    for shape in scene.iter() {
        out.extend(shape_drawables(shape, ui.image_status.get(&shape.id).copied()));
    }
    out
}

/// Map one shape to its drawables. Invisible shapes map to nothing.
#[must_use]
pub fn shape_drawables(shape: &Shape, image_status: Option<ImageStatus>) -> Vec<Drawable> {
    if !shape.visible {
        return Vec::new();
    }
    match &shape.kind {
        ShapeKind::Rectangle => vec![Drawable::of(
            shape,
            Primitive::Rect {
                x: shape.x,
                y: shape.y,
                width: shape.width,
                height: shape.height,
                corner_radius: 0.0,
            },
        )],
        // A circle whose radius is the average of half-width and
        // half-height — a deliberate approximation, not a true ellipse.
        ShapeKind::Ellipse => {
            let center = shape.center();
            let r = (shape.width / 2.0 + shape.height / 2.0) / 2.0;
            vec![Drawable::of(shape, Primitive::Circle { cx: center.x, cy: center.y, r })]
        }
        ShapeKind::Text { content, font_family, font_size } => {
            let mut drawable = Drawable::of(
                shape,
                Primitive::Glyphs {
                    x: shape.x,
                    y: shape.y,
                    content: content.clone(),
                    font_family: font_family.clone(),
                    font_size: *font_size,
                },
            );
            drawable.stroke = None;
            vec![drawable]
        }
        ShapeKind::Image { .. } => image_drawables(shape, image_status),
        ShapeKind::Line { points } => {
            let mut drawable = Drawable::of(
                shape,
                Primitive::Segment {
                    x0: shape.x + points[0],
                    y0: shape.y + points[1],
                    x1: shape.x + points[2],
                    y1: shape.y + points[3],
                },
            );
            drawable.fill = None;
            vec![drawable]
        }
        ShapeKind::Arrow { points, head_length, head_width } => {
            arrow_drawables(shape, *points, *head_length, *head_width)
        }
        ShapeKind::Polygon { points, closed } => {
            let absolute: Vec<f64> = points
                .iter()
                .enumerate()
                .map(|(i, v)| if i % 2 == 0 { shape.x + v } else { shape.y + v })
                .collect();
            let mut drawable =
                Drawable::of(shape, Primitive::PolyLine { points: absolute, closed: *closed });
            if !closed {
                drawable.fill = None;
            }
            vec![drawable]
        }
        ShapeKind::DataCard { data_kind, display_name, display, .. } => {
            card_drawables(shape, data_kind, display_name, display)
        }
        ShapeKind::MermaidDiagram { source } => diagram_drawables(shape, source),
    }
}

fn image_drawables(shape: &Shape, status: Option<ImageStatus>) -> Vec<Drawable> {
    let frame = Primitive::Rect {
        x: shape.x,
        y: shape.y,
        width: shape.width,
        height: shape.height,
        corner_radius: 0.0,
    };
    match status {
        Some(ImageStatus::Loaded) => vec![Drawable::of(shape, frame)],
        // Fixed fallback graphic: frame plus a diagonal cross. The shape's
        // stored geometry and source are untouched by load state.
        Some(ImageStatus::Failed) => {
            let mut frame_drawable = Drawable::of(shape, frame);
            frame_drawable.fill = Some("#F2E4E4".to_owned());
            let (x0, y0) = (shape.x, shape.y);
            let (x1, y1) = (shape.x + shape.width, shape.y + shape.height);
            let mut cross_a =
                Drawable::of(shape, Primitive::Segment { x0, y0, x1, y1 });
            cross_a.fill = None;
            let mut cross_b =
                Drawable::of(shape, Primitive::Segment { x0: x1, y0, x1: x0, y1 });
            cross_b.fill = None;
            vec![frame_drawable, cross_a, cross_b]
        }
        // Pending (or never requested): dashed placeholder frame.
        Some(ImageStatus::Loading) | None => {
            let mut placeholder = Drawable::of(shape, frame);
            placeholder.fill = Some("#F4F6F9".to_owned());
            placeholder.dash = Some(4.0);
            vec![placeholder]
        }
    }
}

fn arrow_drawables(shape: &Shape, points: [f64; 4], head_length: f64, head_width: f64) -> Vec<Drawable> {
    let a = Point::new(shape.x + points[0], shape.y + points[1]);
    let b = Point::new(shape.x + points[2], shape.y + points[3]);

    let mut segment = Drawable::of(
        shape,
        Primitive::Segment { x0: a.x, y0: a.y, x1: b.x, y1: b.y },
    );
    segment.fill = None;

    let len = (b.x - a.x).hypot(b.y - a.y);
    if len <= f64::EPSILON {
        return vec![segment];
    }
    let ux = (b.x - a.x) / len;
    let uy = (b.y - a.y) / len;
    let base_x = b.x - head_length * ux;
    let base_y = b.y - head_length * uy;
    let half = head_width / 2.0;
    let head = Primitive::PolyLine {
        points: vec![
            b.x,
            b.y,
            base_x - half * uy,
            base_y + half * ux,
            base_x + half * uy,
            base_y - half * ux,
        ],
        closed: true,
    };
    let mut head_drawable = Drawable::of(shape, head);
    head_drawable.fill = Some(shape.stroke.clone());
    vec![segment, head_drawable]
}

fn card_drawables(
    shape: &Shape,
    data_kind: &str,
    display_name: &str,
    display: &crate::shape::CardDisplay,
) -> Vec<Drawable> {
    let mut card = Drawable::of(
        shape,
        Primitive::Rect {
            x: shape.x,
            y: shape.y,
            width: shape.width,
            height: shape.height,
            corner_radius: display.corner_radius,
        },
    );
    card.fill = Some(display.background.clone());
    card.stroke = Some(display.border.clone());
    // An unlinked card must be visually distinct.
    if shape.is_unlinked_card() {
        card.dash = Some(6.0);
    }
    let mut out = vec![card];

    if display.show_icon && !data_kind.is_empty() {
        let mut icon = Drawable::of(
            shape,
            Primitive::Rect {
                x: shape.x + 10.0,
                y: shape.y + 10.0,
                width: 18.0,
                height: 18.0,
                corner_radius: 4.0,
            },
        );
        icon.fill = Some(display.border.clone());
        icon.stroke = None;
        out.push(icon);
    }

    let label = if shape.is_unlinked_card() {
        "Select an entity…".to_owned()
    } else if display_name.is_empty() {
        data_kind.to_owned()
    } else {
        display_name.to_owned()
    };
    let mut glyphs = Drawable::of(
        shape,
        Primitive::Glyphs {
            x: shape.x + 12.0,
            y: shape.y + 36.0,
            content: label,
            font_family: "sans-serif".to_owned(),
            font_size: 14.0,
        },
    );
    glyphs.fill = Some("#1F2430".to_owned());
    glyphs.stroke = None;
    out.push(glyphs);
    out
}

fn diagram_drawables(shape: &Shape, source: &str) -> Vec<Drawable> {
    // The core never renders the diagram itself; it paints a frame and the
    // first source line as a caption. The graphic belongs to the external
    // renderer.
    let mut frame = Drawable::of(
        shape,
        Primitive::Rect {
            x: shape.x,
            y: shape.y,
            width: shape.width,
            height: shape.height,
            corner_radius: 6.0,
        },
    );
    frame.fill = Some("#FBFCFE".to_owned());

    let caption = source.lines().next().unwrap_or_default().to_owned();
    let mut glyphs = Drawable::of(
        shape,
        Primitive::Glyphs {
            x: shape.x + 10.0,
            y: shape.y + 10.0,
            content: caption,
            font_family: "monospace".to_owned(),
            font_size: 12.0,
        },
    );
    glyphs.fill = Some("#6A7180".to_owned());
    glyphs.stroke = None;
    vec![frame, glyphs]
}

// =============================================================
// Painter
// =============================================================

/// Draw the full scene: page, grid, shapes, selection UI.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(ctx: &CanvasRenderingContext2d, core: &EngineCore) -> Result<(), JsValue> {
    let settings = &core.settings;
    let viewport = core.viewport;
    // Device pixels per logical unit at the current zoom.
    let scale = settings.unit.to_device(1.0, viewport.zoom);

    ctx.set_transform(core.dpr, 0.0, 0.0, core.dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, core.viewport_width, core.viewport_height);
    ctx.translate(viewport.pan_x, viewport.pan_y)?;
    ctx.scale(scale, scale)?;

    draw_page(ctx, core, scale)?;

    for drawable in scene_drawables(&core.doc, &core.ui) {
        draw_drawable(ctx, &drawable)?;
    }

    if let Some(id) = core.ui.selected_id {
        if let Some(shape) = core.doc.get(id) {
            draw_selection(ctx, core, shape, scale)?;
        }
    }
    Ok(())
}

fn draw_page(ctx: &CanvasRenderingContext2d, core: &EngineCore, scale: f64) -> Result<(), JsValue> {
    let settings = &core.settings;

    ctx.set_fill_style_str(&settings.background);
    ctx.fill_rect(0.0, 0.0, settings.width, settings.height);
    ctx.set_stroke_style_str("#C9CED8");
    ctx.set_line_width(1.0 / scale);
    ctx.stroke_rect(0.0, 0.0, settings.width, settings.height);

    if !settings.grid_enabled || settings.grid_size <= 0.0 {
        return Ok(());
    }
    ctx.set_stroke_style_str(&settings.grid_color);
    ctx.begin_path();
    let mut x = settings.grid_size;
    while x < settings.width {
        ctx.move_to(x, 0.0);
        ctx.line_to(x, settings.height);
        x += settings.grid_size;
    }
    let mut y = settings.grid_size;
    while y < settings.height {
        ctx.move_to(0.0, y);
        ctx.line_to(settings.width, y);
        y += settings.grid_size;
    }
    ctx.stroke();
    Ok(())
}

fn draw_drawable(ctx: &CanvasRenderingContext2d, drawable: &Drawable) -> Result<(), JsValue> {
    ctx.save();
    if drawable.rotation.abs() > 1e-9 {
        ctx.translate(drawable.center.x, drawable.center.y)?;
        ctx.rotate(drawable.rotation.to_radians())?;
        ctx.translate(-drawable.center.x, -drawable.center.y)?;
    }
    if let Some(dash) = drawable.dash {
        set_dash(ctx, dash)?;
    }

    match &drawable.prim {
        Primitive::Rect { x, y, width, height, corner_radius } => {
            ctx.begin_path();
            if *corner_radius > 0.0 {
                rounded_rect_path(ctx, *x, *y, *width, *height, *corner_radius);
            } else {
                ctx.rect(*x, *y, *width, *height);
            }
            fill_and_stroke(ctx, drawable);
        }
        Primitive::Circle { cx, cy, r } => {
            ctx.begin_path();
            ctx.arc(*cx, *cy, *r, 0.0, TAU)?;
            fill_and_stroke(ctx, drawable);
        }
        Primitive::Segment { x0, y0, x1, y1 } => {
            ctx.begin_path();
            ctx.move_to(*x0, *y0);
            ctx.line_to(*x1, *y1);
            stroke_only(ctx, drawable);
        }
        Primitive::PolyLine { points, closed } => {
            let n = points.len() / 2;
            if n >= 2 {
                ctx.begin_path();
                ctx.move_to(points[0], points[1]);
                for i in 1..n {
                    ctx.line_to(points[i * 2], points[i * 2 + 1]);
                }
                if *closed {
                    ctx.close_path();
                }
                fill_and_stroke(ctx, drawable);
            }
        }
        Primitive::Glyphs { x, y, content, font_family, font_size } => {
            if let Some(fill) = &drawable.fill {
                ctx.set_fill_style_str(fill);
            }
            ctx.set_text_align("left");
            ctx.set_text_baseline("top");
            ctx.set_font(&format!("{font_size}px {font_family}"));
            let line_height = font_size * 1.25;
            for (i, line) in content.lines().enumerate() {
                #[allow(clippy::cast_precision_loss)]
                let line_y = y + (i as f64) * line_height;
                ctx.fill_text(line, *x, line_y)?;
            }
        }
    }

    ctx.restore();
    Ok(())
}

fn fill_and_stroke(ctx: &CanvasRenderingContext2d, drawable: &Drawable) {
    if let Some(fill) = &drawable.fill {
        ctx.set_fill_style_str(fill);
        ctx.fill();
    }
    stroke_only(ctx, drawable);
}

fn stroke_only(ctx: &CanvasRenderingContext2d, drawable: &Drawable) {
    if let Some(stroke) = &drawable.stroke {
        ctx.set_stroke_style_str(stroke);
        ctx.set_line_width(drawable.stroke_width);
        ctx.stroke();
    }
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0);
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.quadratic_curve_to(x + w, y, x + w, y + r);
    ctx.line_to(x + w, y + h - r);
    ctx.quadratic_curve_to(x + w, y + h, x + w - r, y + h);
    ctx.line_to(x + r, y + h);
    ctx.quadratic_curve_to(x, y + h, x, y + h - r);
    ctx.line_to(x, y + r);
    ctx.quadratic_curve_to(x, y, x + r, y);
    ctx.close_path();
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: f64) -> Result<(), JsValue> {
    let array = js_sys::Array::new();
    array.push(&dash.into());
    array.push(&dash.into());
    ctx.set_line_dash(&array)
}

// =============================================================
// Selection UI
// =============================================================

fn draw_selection(
    ctx: &CanvasRenderingContext2d,
    core: &EngineCore,
    shape: &Shape,
    scale: f64,
) -> Result<(), JsValue> {
    let handle_size = HANDLE_RADIUS_PX / scale;

    if shape.is_connector() {
        let Some((a, b)) = shape.endpoints() else {
            return Ok(());
        };
        ctx.save();
        ctx.set_fill_style_str("#fff");
        ctx.set_stroke_style_str(SELECTION_COLOR);
        ctx.set_line_width(1.0 / scale);
        for pt in [a, b] {
            ctx.begin_path();
            ctx.arc(pt.x, pt.y, handle_size, 0.0, TAU)?;
            ctx.fill();
            ctx.stroke();
        }
        ctx.restore();
        return Ok(());
    }

    // Dashed bounding box, rotated with the shape.
    ctx.save();
    let center = shape.center();
    ctx.translate(center.x, center.y)?;
    ctx.rotate(shape.rotation.to_radians())?;
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.0 / scale);
    set_dash(ctx, SELECTION_DASH_PX / scale)?;
    ctx.stroke_rect(-shape.width / 2.0, -shape.height / 2.0, shape.width, shape.height);
    ctx.set_line_dash(&js_sys::Array::new())?;
    ctx.restore();

    if shape.locked {
        return Ok(());
    }

    // Resize handles, drawn unrotated at their rotated positions.
    ctx.save();
    ctx.set_fill_style_str("#fff");
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.0 / scale);
    let handles = hit::resize_handle_positions(shape);
    for pos in &handles {
        ctx.fill_rect(pos.x - handle_size, pos.y - handle_size, handle_size * 2.0, handle_size * 2.0);
        ctx.stroke_rect(pos.x - handle_size, pos.y - handle_size, handle_size * 2.0, handle_size * 2.0);
    }

    // Rotate handle with its stalk from the N handle.
    let rotate_offset = core
        .viewport
        .device_dist_to_logical(core.settings.unit, ROTATE_HANDLE_OFFSET_PX);
    let rotate_pos = hit::rotate_handle_position(shape, rotate_offset);
    let north = handles[0];
    ctx.begin_path();
    ctx.move_to(north.x, north.y);
    ctx.line_to(rotate_pos.x, rotate_pos.y);
    ctx.stroke();
    ctx.begin_path();
    ctx.arc(rotate_pos.x, rotate_pos.y, handle_size, 0.0, TAU)?;
    ctx.fill();
    ctx.stroke();
    ctx.restore();
    Ok(())
}
