//! Scroll surface the engine drives: viewport, zoom, per-axis offsets.
//!
//! The egui viewer implements it for real; tests use an in-memory one.
//! Offsets are in screen pixels (strip coordinates times scale).

use crate::entities::{Canvas, Direction, Size};

pub trait ScrollSurface {
    /// Visible area in screen pixels.
    fn viewport_size(&self) -> Size;

    /// Current zoom factor (1.0 = strip pixels map 1:1).
    fn scale(&self) -> f64;

    fn set_scale(&mut self, scale: f64);

    fn offset(&self, axis: Direction) -> f64;

    /// Move the scroll position. Implementations may clamp to the content.
    fn set_offset(&mut self, axis: Direction, offset: f64);

    /// New strip canvas after a layout pass (unscaled).
    fn set_canvas(&mut self, canvas: Canvas);
}
