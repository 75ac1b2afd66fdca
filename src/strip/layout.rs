//! Layout engine: native sizes + viewport -> slide rectangles in strip space.
//!
//! Pure function of its inputs. For a horizontal strip every item is scaled
//! to the viewport height (`width = round(native_w * vh / native_h)`); a
//! vertical strip is the transpose. Items are packed edge to edge along the
//! primary axis after a leading padding of half the viewport, so the first
//! and last items can be centered.
//!
//! # Order
//!
//! `Forward` walks a cursor up from `padding`; `Backward` walks it down from
//! `padding + total`. Both use the same integer extents, so backward
//! placement is the exact mirror of forward placement about the canvas
//! center and adjacent edges coincide in both.
//!
//! # Unreadable items
//!
//! An item without a native size (or whose rendered extent rounds to zero)
//! keeps its slot as a zero-size rectangle at the cursor. Slot `i` always
//! corresponds to list entry `i`.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::entities::{Canvas, Direction, Rect, Size};

/// Placement order along the primary axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutOrder {
    /// First item at the left (top).
    #[default]
    Forward,
    /// First item at the right (bottom).
    Backward,
}

impl LayoutOrder {
    pub fn toggled(self) -> Self {
        match self {
            LayoutOrder::Forward => LayoutOrder::Backward,
            LayoutOrder::Backward => LayoutOrder::Forward,
        }
    }

    /// +1 for forward, -1 for backward: maps physical input to index steps.
    pub fn sign(self) -> isize {
        match self {
            LayoutOrder::Forward => 1,
            LayoutOrder::Backward => -1,
        }
    }
}

/// Result of a layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct StripLayout {
    /// One rectangle per list entry; empty for unplaceable entries.
    pub geometries: Vec<Rect>,
    pub canvas: Canvas,
    /// Leading/trailing space on the primary axis.
    pub padding: u32,
    /// Sum of placed extents on the primary axis.
    pub total_length: u64,
    pub direction: Direction,
    pub order: LayoutOrder,
}

impl StripLayout {
    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Number of entries that received a non-empty rectangle.
    pub fn placed_count(&self) -> usize {
        self.geometries.iter().filter(|r| !r.is_empty()).count()
    }
}

/// Rendered extent along the primary axis for an item fitted to the viewport's cross axis.
///
/// Returns 0 for unreadable or degenerate sizes.
pub fn rendered_extent(native: Size, viewport: Size, direction: Direction) -> u32 {
    if native.is_empty() || viewport.is_empty() {
        return 0;
    }
    let (along, cross_native, cross_view) = match direction {
        Direction::Horizontal => (native.width, native.height, viewport.height),
        Direction::Vertical => (native.height, native.width, viewport.width),
    };
    let scale = f64::from(cross_view) / f64::from(cross_native);
    let extent = (f64::from(along) * scale).round();
    if extent >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        extent as u32
    }
}

/// Compute the strip layout.
///
/// Returns `None` when the viewport is empty: layout is skipped and must be
/// retried after the next valid resize.
pub fn compute(
    natives: &[Option<Size>],
    viewport: Size,
    direction: Direction,
    order: LayoutOrder,
) -> Option<StripLayout> {
    if viewport.is_empty() {
        warn!("Layout skipped: empty viewport {}x{}", viewport.width, viewport.height);
        return None;
    }

    let padding = viewport.along(direction) / 2;

    if natives.is_empty() {
        return Some(StripLayout {
            geometries: Vec::new(),
            canvas: Canvas::from(viewport),
            padding,
            total_length: 0,
            direction,
            order,
        });
    }

    let extents: Vec<u32> = natives
        .iter()
        .map(|n| n.map_or(0, |size| rendered_extent(size, viewport, direction)))
        .collect();
    let total_length: u64 = extents.iter().map(|&e| u64::from(e)).sum();

    let cross = match direction {
        Direction::Horizontal => viewport.height,
        Direction::Vertical => viewport.width,
    };
    let rect_at = |pos: i64, extent: u32| -> Rect {
        if extent == 0 {
            return match direction {
                Direction::Horizontal => Rect::new(pos, 0, 0, 0),
                Direction::Vertical => Rect::new(0, pos, 0, 0),
            };
        }
        match direction {
            Direction::Horizontal => Rect::new(pos, 0, extent, cross),
            Direction::Vertical => Rect::new(0, pos, cross, extent),
        }
    };

    let mut geometries = Vec::with_capacity(extents.len());
    match order {
        LayoutOrder::Forward => {
            let mut cursor = i64::from(padding);
            for &extent in &extents {
                geometries.push(rect_at(cursor, extent));
                cursor += i64::from(extent);
            }
        }
        LayoutOrder::Backward => {
            let mut cursor = i64::from(padding) + total_length as i64;
            for &extent in &extents {
                cursor -= i64::from(extent);
                geometries.push(rect_at(cursor, extent));
            }
        }
    }

    let primary = total_length + 2 * u64::from(padding);
    let canvas = match direction {
        Direction::Horizontal => Canvas {
            width: primary,
            height: u64::from(viewport.height),
        },
        Direction::Vertical => Canvas {
            width: u64::from(viewport.width),
            height: primary,
        },
    };

    let layout = StripLayout {
        geometries,
        canvas,
        padding,
        total_length,
        direction,
        order,
    };
    debug!(
        "Layout: {} items ({} placed), {:?}/{:?}, canvas {}x{}",
        layout.len(),
        layout.placed_count(),
        direction,
        order,
        canvas.width,
        canvas.height
    );
    Some(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size::new(800, 600);

    fn sample_sizes(n: usize) -> Vec<Option<Size>> {
        (0..n)
            .map(|i| Some(Size::new(100 + (i as u32 * 137) % 900, 150 + (i as u32 * 59) % 700)))
            .collect()
    }

    fn assert_contiguous(layout: &StripLayout) {
        let dir = layout.direction;
        let placed: Vec<&Rect> = match layout.order {
            LayoutOrder::Forward => layout.geometries.iter().filter(|r| !r.is_empty()).collect(),
            LayoutOrder::Backward => layout.geometries.iter().rev().filter(|r| !r.is_empty()).collect(),
        };
        for pair in placed.windows(2) {
            assert_eq!(pair[0].end(dir), pair[1].start(dir), "gap or overlap between {:?} and {:?}", pair[0], pair[1]);
        }
        if let (Some(first), Some(last)) = (placed.first(), placed.last()) {
            assert_eq!(first.start(dir), i64::from(layout.padding));
            assert_eq!(last.end(dir), i64::from(layout.padding) + layout.total_length as i64);
        }
    }

    #[test]
    fn test_twenty_images_horizontal_forward_canvas() {
        let sizes = sample_sizes(20);
        let layout = compute(&sizes, VIEWPORT, Direction::Horizontal, LayoutOrder::Forward).unwrap();

        let expected_sum: u64 = sizes
            .iter()
            .map(|s| {
                let s = s.unwrap();
                (f64::from(s.width) * 600.0 / f64::from(s.height)).round() as u64
            })
            .sum();
        assert_eq!(layout.canvas.width, expected_sum + 2 * 400);
        assert_eq!(layout.canvas.height, 600);
        assert_eq!(layout.padding, 400);
        assert!(layout.geometries.iter().all(|r| r.height == 600 && r.y == 0));
        assert_contiguous(&layout);
    }

    #[test]
    fn test_adjacent_edges_coincide_every_orientation() {
        let sizes = sample_sizes(37);
        for direction in [Direction::Horizontal, Direction::Vertical] {
            for order in [LayoutOrder::Forward, LayoutOrder::Backward] {
                for viewport in [Size::new(800, 600), Size::new(1023, 767), Size::new(3, 1)] {
                    let layout = compute(&sizes, viewport, direction, order).unwrap();
                    assert_contiguous(&layout);
                }
            }
        }
    }

    #[test]
    fn test_backward_is_exact_mirror_of_forward() {
        let sizes = sample_sizes(25);
        for direction in [Direction::Horizontal, Direction::Vertical] {
            let fwd = compute(&sizes, Size::new(1001, 777), direction, LayoutOrder::Forward).unwrap();
            let bwd = compute(&sizes, Size::new(1001, 777), direction, LayoutOrder::Backward).unwrap();
            assert_eq!(fwd.canvas, bwd.canvas);

            let extent = fwd.canvas.along(direction) as i64;
            for (f, b) in fwd.geometries.iter().zip(&bwd.geometries) {
                assert_eq!(f.size(), b.size());
                assert_eq!(b.start(direction), extent - f.end(direction));
            }
        }
    }

    #[test]
    fn test_vertical_fixes_width() {
        let sizes = vec![Some(Size::new(1600, 900)), Some(Size::new(400, 1000))];
        let layout = compute(&sizes, VIEWPORT, Direction::Vertical, LayoutOrder::Forward).unwrap();
        assert_eq!(layout.geometries[0], Rect::new(0, 300, 800, 450));
        assert_eq!(layout.geometries[1], Rect::new(0, 750, 800, 2000));
        assert_eq!(layout.canvas, Canvas { width: 800, height: 2450 + 600 });
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        // 3 * 600 / 4 = 450; 1001 * 0.6 = 600.6 -> 601; 5 * 60 / 200 = 1.5 -> 2
        assert_eq!(rendered_extent(Size::new(3, 4), VIEWPORT, Direction::Horizontal), 450);
        assert_eq!(rendered_extent(Size::new(1001, 1000), VIEWPORT, Direction::Horizontal), 601);
        assert_eq!(rendered_extent(Size::new(5, 200), Size::new(10, 60), Direction::Horizontal), 2);
    }

    #[test]
    fn test_unreadable_items_keep_zero_size_slot() {
        let sizes = vec![Some(Size::new(400, 300)), None, Some(Size::new(800, 600))];
        let layout = compute(&sizes, VIEWPORT, Direction::Horizontal, LayoutOrder::Forward).unwrap();

        assert_eq!(layout.len(), 3);
        assert_eq!(layout.placed_count(), 2);
        assert_eq!(layout.geometries[0], Rect::new(400, 0, 800, 600));
        assert!(layout.geometries[1].is_empty());
        assert_eq!(layout.geometries[1].x, 1200);
        assert_eq!(layout.geometries[2], Rect::new(1200, 0, 800, 600));
        assert_eq!(layout.canvas.width, 1600 + 800);
        assert_contiguous(&layout);
    }

    #[test]
    fn test_empty_list_gives_viewport_canvas() {
        let layout = compute(&[], VIEWPORT, Direction::Horizontal, LayoutOrder::Forward).unwrap();
        assert!(layout.is_empty());
        assert_eq!(layout.canvas, Canvas { width: 800, height: 600 });
    }

    #[test]
    fn test_empty_viewport_skips_layout() {
        let sizes = sample_sizes(3);
        assert!(compute(&sizes, Size::new(0, 600), Direction::Horizontal, LayoutOrder::Forward).is_none());
        assert!(compute(&sizes, Size::new(800, 0), Direction::Vertical, LayoutOrder::Backward).is_none());
    }
}
