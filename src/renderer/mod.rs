//! Rendering module
//!
//! Games emit layered draw lists; the canvas backend (wasm only) replays
//! them on a 2D context.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod draw;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasBackend;
pub use draw::{Color, DrawCmd, DrawList, Layer, colors};
