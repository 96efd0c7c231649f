//! Unit conversion and the zoomable viewport.
//!
//! Shape geometry is persisted in a logical unit (CSS pixels for note
//! documents, millimeters for A4 page layouts) and converted to device
//! pixels only at render and hit-test time. Conversions always go through
//! this module so that zoom or DPI changes can never leak back into stored
//! geometry.

#[cfg(test)]
#[path = "units_test.rs"]
mod units_test;

use serde::{Deserialize, Serialize};

use crate::consts::{PX_PER_MM, ZOOM_MAX, ZOOM_MIN};

/// A point in either device or logical space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The logical unit a document's geometry is authored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// CSS pixels; logical and device values coincide at zoom 1.
    #[default]
    Px,
    /// Millimeters; converted through [`PX_PER_MM`].
    Mm,
}

impl Unit {
    /// Convert a logical value to device pixels at the given zoom.
    #[must_use]
    pub fn to_device(self, logical: f64, zoom: f64) -> f64 {
        match self {
            Self::Px => logical * zoom,
            Self::Mm => logical * PX_PER_MM * zoom,
        }
    }

    /// Convert a device-pixel value back to the logical unit.
    #[must_use]
    pub fn from_device(self, device: f64, zoom: f64) -> f64 {
        match self {
            Self::Px => device / zoom,
            Self::Mm => device / (PX_PER_MM * zoom),
        }
    }
}

/// Round `value` to the nearest multiple of `grid`.
///
/// A non-positive grid disables quantization and returns `value` unchanged.
/// Idempotent: `quantize(quantize(v, g), g) == quantize(v, g)`.
#[must_use]
pub fn quantize(value: f64, grid: f64) -> f64 {
    if grid <= 0.0 {
        return value;
    }
    (value / grid).round() * grid
}

/// Viewport state for zoom and pan over the page.
///
/// `pan_x` / `pan_y` are in device pixels. `zoom` is a scale factor
/// (1.0 = no zoom), clamped to `[ZOOM_MIN, ZOOM_MAX]` by [`Viewport::set_zoom`].
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Viewport {
    /// Convert a device-space point to logical coordinates.
    #[must_use]
    pub fn to_logical(&self, unit: Unit, device: Point) -> Point {
        Point {
            x: unit.from_device(device.x - self.pan_x, self.zoom),
            y: unit.from_device(device.y - self.pan_y, self.zoom),
        }
    }

    /// Convert a logical point to device coordinates.
    #[must_use]
    pub fn to_device(&self, unit: Unit, logical: Point) -> Point {
        Point {
            x: unit.to_device(logical.x, self.zoom) + self.pan_x,
            y: unit.to_device(logical.y, self.zoom) + self.pan_y,
        }
    }

    /// Convert a device-space distance to logical distance.
    #[must_use]
    pub fn device_dist_to_logical(&self, unit: Unit, device_dist: f64) -> f64 {
        unit.from_device(device_dist, self.zoom)
    }

    /// Set the zoom factor, clamped to the supported range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// Zoom by `factor` keeping the device point `anchor` fixed on screen.
    pub fn zoom_about(&mut self, factor: f64, anchor: Point) {
        let old = self.zoom;
        self.set_zoom(old * factor);
        let applied = self.zoom / old;
        self.pan_x = anchor.x - (anchor.x - self.pan_x) * applied;
        self.pan_y = anchor.y - (anchor.y - self.pan_y) * applied;
    }
}
