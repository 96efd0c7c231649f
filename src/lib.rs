//! Interactive document/shape canvas core for the A4 layout editor and the
//! document-canvas note editor.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns a
//! mutable scene of typed shapes on a zoomable page surface: translating raw
//! DOM input events into scene mutations, snapping to the grid, keeping a
//! bounded undo/redo history of scene snapshots, enforcing the
//! single-selection transform contract, and rendering the scene. The host
//! layer wires DOM events to the engine, processes the resulting
//! [`engine::Action`]s, and hosts the external collaborators (persistence,
//! entity-link selector, diagram editor, raster export).
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Command reducer, event handlers, and testable [`engine::EngineCore`] |
//! | [`doc`] | Scene (flat ordered shape list), settings, persistence payload |
//! | [`shape`] | Typed shape model with total per-variant defaults |
//! | [`history`] | Bounded snapshot undo/redo |
//! | [`units`] | mm/px ↔ device conversion, grid quantization, viewport |
//! | [`hit`] | Hit-testing against shapes and transform handles |
//! | [`input`] | Input event types, UI state, and the gesture state machine |
//! | [`render`] | Shape → drawable mapping and the Canvas2D painter |
//! | [`consts`] | Shared numeric constants (zoom limits, defaults, etc.) |

pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod history;
pub mod input;
pub mod render;
pub mod shape;
pub mod units;

/// Route wasm panics to the browser console. Called once by the host at
/// startup.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}
