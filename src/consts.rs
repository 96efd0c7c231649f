//! Shared numeric constants for the canvas crate.

// ── Units ───────────────────────────────────────────────────────

/// Device pixels per millimeter at the CSS reference DPI (96 / 25.4).
pub const PX_PER_MM: f64 = 96.0 / 25.4;

/// Zoom factor limits for the viewport.
pub const ZOOM_MIN: f64 = 0.1;
pub const ZOOM_MAX: f64 = 8.0;

/// Multiplicative zoom step applied per wheel notch.
pub const ZOOM_STEP: f64 = 1.1;

// ── Shape defaults ──────────────────────────────────────────────

/// Default extents of a new text shape, in logical units.
pub const TEXT_DEFAULT_WIDTH: f64 = 200.0;
pub const TEXT_DEFAULT_HEIGHT: f64 = 50.0;

/// Default font size of a new text shape, in points.
pub const TEXT_DEFAULT_FONT_SIZE: f64 = 16.0;

/// Radius of the circle a new regular polygon is inscribed in.
pub const POLYGON_DEFAULT_RADIUS: f64 = 50.0;

/// Side count of the default polygon (a pentagon).
pub const POLYGON_DEFAULT_SIDES: usize = 5;

/// Default length of a new line or arrow segment, in logical units.
pub const CONNECTOR_DEFAULT_LENGTH: f64 = 100.0;

/// Default arrowhead extents, in logical units.
pub const ARROW_HEAD_LENGTH: f64 = 10.0;
pub const ARROW_HEAD_WIDTH: f64 = 10.0;

// ── Editing ─────────────────────────────────────────────────────

/// Offset applied to pasted and duplicated shapes, in logical units.
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// Maximum number of undo snapshots retained (oldest evicted first).
pub const HISTORY_CAP: usize = 100;

// ── Hit-testing ─────────────────────────────────────────────────

/// Device-space hit slop in pixels for handles and thin segments.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Distance from the bounding box edge to the rotate handle, in device pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 24.0;
