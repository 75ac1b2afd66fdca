//! Integer geometry in strip (scene) space.
//!
//! Positions are `i64` so long strips never overflow; extents are `u32`
//! pixel sizes as produced by the layout.

use serde::{Deserialize, Serialize};

/// Primary scroll axis of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Items left-to-right, heights fixed to the viewport.
    #[default]
    Horizontal,
    /// Items top-to-bottom, widths fixed to the viewport.
    Vertical,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::Horizontal => Direction::Vertical,
            Direction::Vertical => Direction::Horizontal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Extent along `direction`.
    pub fn along(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Horizontal => self.width,
            Direction::Vertical => self.height,
        }
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in strip space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    /// Leading edge on the primary axis.
    pub fn start(&self, direction: Direction) -> i64 {
        match direction {
            Direction::Horizontal => self.x,
            Direction::Vertical => self.y,
        }
    }

    /// Trailing edge on the primary axis (exclusive).
    pub fn end(&self, direction: Direction) -> i64 {
        self.start(direction) + i64::from(self.size().along(direction))
    }

    /// Geometric center on the primary axis.
    pub fn center(&self, direction: Direction) -> f64 {
        self.start(direction) as f64 + f64::from(self.size().along(direction)) / 2.0
    }
}

/// Total scrollable canvas of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Canvas {
    pub width: u64,
    pub height: u64,
}

impl Canvas {
    pub fn along(&self, direction: Direction) -> u64 {
        match direction {
            Direction::Horizontal => self.width,
            Direction::Vertical => self.height,
        }
    }
}

impl From<Size> for Canvas {
    fn from(size: Size) -> Self {
        Self {
            width: u64::from(size.width),
            height: u64::from(size.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges_and_center() {
        let r = Rect::new(400, 0, 101, 600);
        assert_eq!(r.start(Direction::Horizontal), 400);
        assert_eq!(r.end(Direction::Horizontal), 501);
        assert_eq!(r.center(Direction::Horizontal), 450.5);
        assert_eq!(r.center(Direction::Vertical), 300.0);
    }

    #[test]
    fn test_empty() {
        assert!(Size::new(0, 10).is_empty());
        assert!(Rect::new(5, 0, 0, 0).is_empty());
        assert!(!Size::new(1, 1).is_empty());
    }
}
