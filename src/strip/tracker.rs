//! Scroll position tracker: infers the centered index from organic scrolling.

use log::trace;
use std::time::{Duration, Instant};

use crate::core::Debouncer;
use crate::entities::{Direction, Rect};

#[derive(Debug)]
pub struct ScrollTracker {
    debounce: Debouncer<()>,
}

impl ScrollTracker {
    pub fn new(delay: Duration) -> Self {
        Self {
            debounce: Debouncer::new("scroll-infer", delay),
        }
    }

    /// Scroll-changed signal: restart the debounce.
    pub fn on_scroll(&mut self, now: Instant) {
        self.debounce.schedule((), now);
    }

    /// Stop a pending inference (programmatic navigation started).
    pub fn halt(&mut self) {
        self.debounce.cancel();
    }

    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// True when the debounce fired and inference should run.
    ///
    /// A firing during programmatic navigation is dropped; the next scroll
    /// signal re-arms it.
    pub fn poll(&mut self, now: Instant, navigation_busy: bool) -> bool {
        if self.debounce.poll(now).is_none() {
            return false;
        }
        if navigation_busy {
            trace!("Scroll inference dropped: navigation in progress");
            return false;
        }
        true
    }
}

/// Scene-space coordinate at the viewport center on the primary axis.
pub fn scene_coordinate(offset: f64, viewport_extent: f64, scale: f64) -> f64 {
    let scale = if scale > 0.0 { scale } else { 1.0 };
    (offset + viewport_extent / 2.0) / scale
}

/// Index of the placed slide whose center is nearest `coord`.
///
/// Zero-size placeholders never win. Ties go to the lowest index.
pub fn nearest_index(geometries: &[Rect], direction: Direction, coord: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, rect) in geometries.iter().enumerate() {
        if rect.is_empty() {
            continue;
        }
        let distance = (rect.center(direction) - coord).abs();
        match best {
            Some((_, d)) if d <= distance => {}
            _ => best = Some((index, distance)),
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn row(widths: &[u32]) -> Vec<Rect> {
        let mut x = 400;
        widths
            .iter()
            .map(|&w| {
                let r = Rect::new(x, 0, w, if w == 0 { 0 } else { 600 });
                x += i64::from(w);
                r
            })
            .collect()
    }

    #[test]
    fn test_nearest_center() {
        let rects = row(&[200, 200, 200]);
        // centers: 500, 700, 900
        assert_eq!(nearest_index(&rects, Direction::Horizontal, 0.0), Some(0));
        assert_eq!(nearest_index(&rects, Direction::Horizontal, 690.0), Some(1));
        assert_eq!(nearest_index(&rects, Direction::Horizontal, 5000.0), Some(2));
    }

    #[test]
    fn test_tie_goes_to_lowest_index() {
        let rects = row(&[200, 200]);
        assert_eq!(nearest_index(&rects, Direction::Horizontal, 600.0), Some(0));
    }

    #[test]
    fn test_placeholders_never_win() {
        let rects = row(&[200, 0, 200]);
        // placeholder center (600) is exactly at coord
        assert_eq!(nearest_index(&rects, Direction::Horizontal, 600.0), Some(0));
        assert_eq!(nearest_index(&[Rect::default()], Direction::Horizontal, 0.0), None);
    }

    #[test]
    fn test_scene_coordinate_applies_scale() {
        assert_eq!(scene_coordinate(100.0, 800.0, 1.0), 500.0);
        assert_eq!(scene_coordinate(600.0, 800.0, 2.0), 500.0);
    }

    #[test]
    fn test_debounce_and_drop_while_busy() {
        let t0 = Instant::now();
        let mut tracker = ScrollTracker::new(ms(40));
        tracker.on_scroll(t0);
        tracker.on_scroll(t0 + ms(30));
        assert!(!tracker.poll(t0 + ms(60), false));
        assert!(tracker.poll(t0 + ms(70), false));

        tracker.on_scroll(t0 + ms(100));
        assert!(!tracker.poll(t0 + ms(140), true));
        assert!(!tracker.is_pending(), "dropped firing is not re-queued");
    }
}
