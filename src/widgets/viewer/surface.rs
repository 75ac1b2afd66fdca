//! Scroll surface backed by a plain egui panel.
//!
//! Offsets and the viewport are in egui points. Stored offsets are raw;
//! reads clamp them to the scaled canvas so the engine can write offset and
//! scale in either order during a zoom.

use eframe::egui;

use crate::entities::{Canvas, Direction, Size};
use crate::strip::ScrollSurface;

#[derive(Debug, Clone)]
pub struct EguiSurface {
    viewport: Size,
    scale: f64,
    offsets: [f64; 2],
    canvas: Canvas,
}

impl Default for EguiSurface {
    fn default() -> Self {
        Self::new()
    }
}

fn slot(axis: Direction) -> usize {
    match axis {
        Direction::Horizontal => 0,
        Direction::Vertical => 1,
    }
}

impl EguiSurface {
    pub fn new() -> Self {
        Self {
            viewport: Size::default(),
            scale: 1.0,
            offsets: [0.0; 2],
            canvas: Canvas::default(),
        }
    }

    /// Adopt the panel size. Returns true if it changed.
    pub fn set_viewport(&mut self, size: egui::Vec2) -> bool {
        let size = Size::new(size.x.max(0.0).round() as u32, size.y.max(0.0).round() as u32);
        if size == self.viewport {
            return false;
        }
        self.viewport = size;
        true
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Largest valid offset on `axis` at the current scale.
    pub fn max_offset(&self, axis: Direction) -> f64 {
        let content = self.canvas.along(axis) as f64 * self.scale;
        (content - f64::from(self.viewport.along(axis))).max(0.0)
    }

    /// Pan by a screen-space drag delta. Returns the axes whose offset moved.
    pub fn pan(&mut self, delta: egui::Vec2) -> Vec<Direction> {
        let mut moved = Vec::new();
        for (axis, d) in [(Direction::Horizontal, delta.x), (Direction::Vertical, delta.y)] {
            let before = self.offset(axis);
            let after = (before - f64::from(d)).clamp(0.0, self.max_offset(axis));
            self.offsets[slot(axis)] = after;
            if (after - before).abs() > f64::EPSILON {
                moved.push(axis);
            }
        }
        moved
    }

    /// Screen position of strip point (`x`, `y`) for a panel whose top-left is `origin`.
    pub fn to_screen(&self, origin: egui::Pos2, x: i64, y: i64) -> egui::Pos2 {
        egui::pos2(
            origin.x + (x as f64 * self.scale - self.offset(Direction::Horizontal)) as f32,
            origin.y + (y as f64 * self.scale - self.offset(Direction::Vertical)) as f32,
        )
    }
}

impl ScrollSurface for EguiSurface {
    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn offset(&self, axis: Direction) -> f64 {
        self.offsets[slot(axis)].clamp(0.0, self.max_offset(axis))
    }

    fn set_offset(&mut self, axis: Direction, offset: f64) {
        self.offsets[slot(axis)] = offset;
    }

    fn set_canvas(&mut self, canvas: Canvas) {
        self.canvas = canvas;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> EguiSurface {
        let mut s = EguiSurface::new();
        s.set_viewport(egui::vec2(800.0, 600.0));
        s.set_canvas(Canvas { width: 4000, height: 600 });
        s
    }

    #[test]
    fn test_offsets_clamp_on_read() {
        let mut s = surface();
        s.set_offset(Direction::Horizontal, -50.0);
        assert_eq!(s.offset(Direction::Horizontal), 0.0);
        s.set_offset(Direction::Horizontal, 10_000.0);
        assert_eq!(s.offset(Direction::Horizontal), 3200.0);
        s.set_offset(Direction::Vertical, 40.0);
        assert_eq!(s.offset(Direction::Vertical), 0.0);
    }

    #[test]
    fn test_zoom_widens_range() {
        let mut s = surface();
        s.set_offset(Direction::Vertical, 150.0);
        s.set_scale(1.5);
        assert_eq!(s.max_offset(Direction::Vertical), 300.0);
        assert_eq!(s.offset(Direction::Vertical), 150.0);
    }

    #[test]
    fn test_pan_reports_moved_axes() {
        let mut s = surface();
        s.set_offset(Direction::Horizontal, 1000.0);
        let moved = s.pan(egui::vec2(-100.0, 30.0));
        assert_eq!(moved, vec![Direction::Horizontal]);
        assert_eq!(s.offset(Direction::Horizontal), 1100.0);
        assert!(s.pan(egui::Vec2::ZERO).is_empty());
    }

    #[test]
    fn test_viewport_change_detected_once() {
        let mut s = EguiSurface::new();
        assert!(s.set_viewport(egui::vec2(640.4, 480.0)));
        assert!(!s.set_viewport(egui::vec2(640.0, 480.0)));
        assert_eq!(s.viewport_size(), Size::new(640, 480));
    }

    #[test]
    fn test_to_screen_applies_scale_and_offset() {
        let mut s = surface();
        s.set_offset(Direction::Horizontal, 100.0);
        s.set_scale(2.0);
        let p = s.to_screen(egui::pos2(10.0, 20.0), 300, 0);
        assert_eq!(p, egui::pos2(510.0, 20.0));
    }
}
