//! Window manager: bounded materialize/evict of slide visuals around the focus.
//!
//! Slides live in a dense array indexed by list position, each holding an
//! optional [`Visual`]. Only indices in `[focus - 5, focus + 5]` may hold one.
//! Static slides are materialized through the decode queue; animated ones are
//! opened synchronously and driven by [`SlideWindow::advance_playbacks`].
//!
//! Invariants:
//! - at most one outstanding decode per index (`in_flight`)
//! - a decode result is attached only if its index is still inside the
//!   current window and the slot is still empty
//! - a failed slot is not retried until the next rebuild

use image::RgbaImage;
use log::{debug, trace};
use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use super::animation::AnimatedPlayback;
use super::decode::{DecodeQueue, DecodeRequest, DecodeResult};
use super::layout::StripLayout;
use crate::entities::{MediaBackend, Rect};

/// Half-width of the materialization window.
pub const WINDOW_RADIUS: usize = 5;

/// Indices of the window around `focus` for a list of `len` items.
///
/// `len` must be non-zero; `focus` is clamped to the list.
pub fn window_range(focus: usize, len: usize) -> RangeInclusive<usize> {
    let last = len.saturating_sub(1);
    let focus = focus.min(last);
    focus.saturating_sub(WINDOW_RADIUS)..=(focus + WINDOW_RADIUS).min(last)
}

/// Presentable bitmap placed at a slide's geometry.
#[derive(Debug, Clone)]
pub struct Visual {
    pub bitmap: RgbaImage,
    /// Top-left corner in strip space.
    pub origin: (i64, i64),
    /// Bumped whenever the bitmap changes (animation frames), for texture caches.
    pub revision: u64,
}

/// One list entry in strip space.
#[derive(Debug, Clone)]
pub struct Slide {
    pub path: PathBuf,
    pub geometry: Rect,
    pub visual: Option<Visual>,
}

impl Slide {
    /// False for unreadable entries, which keep a zero-size placeholder.
    pub fn is_placeable(&self) -> bool {
        !self.geometry.is_empty()
    }

    pub fn is_materialized(&self) -> bool {
        self.visual.is_some()
    }
}

pub struct SlideWindow {
    slides: Vec<Slide>,
    in_flight: HashSet<usize>,
    failed: HashSet<usize>,
    playbacks: HashMap<usize, AnimatedPlayback>,
    animated: HashMap<usize, bool>,
    focus: Option<usize>,
    next_revision: u64,
    backend: Arc<dyn MediaBackend>,
}

impl std::fmt::Debug for SlideWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlideWindow")
            .field("slides", &self.slides.len())
            .field("focus", &self.focus)
            .field("materialized", &self.materialized_indices())
            .field("in_flight", &self.in_flight.len())
            .field("playbacks", &self.playbacks.len())
            .finish()
    }
}

impl SlideWindow {
    pub fn new(backend: Arc<dyn MediaBackend>) -> Self {
        Self {
            slides: Vec::new(),
            in_flight: HashSet::new(),
            failed: HashSet::new(),
            playbacks: HashMap::new(),
            animated: HashMap::new(),
            focus: None,
            next_revision: 0,
            backend,
        }
    }

    /// Replace all slides with a fresh layout, discarding every visual.
    ///
    /// Outstanding decodes are forgotten; their results must be filtered by
    /// epoch before they reach [`on_decoded`](Self::on_decoded).
    pub fn rebuild(&mut self, paths: &[PathBuf], layout: &StripLayout) {
        debug_assert_eq!(paths.len(), layout.len());
        self.clear();
        self.slides = paths
            .iter()
            .zip(&layout.geometries)
            .map(|(path, geometry)| Slide {
                path: path.clone(),
                geometry: *geometry,
                visual: None,
            })
            .collect();
        debug!("Window rebuilt: {} slides", self.slides.len());
    }

    /// Drop all slides, visuals, playbacks, and bookkeeping.
    pub fn clear(&mut self) {
        self.slides.clear();
        self.in_flight.clear();
        self.failed.clear();
        self.playbacks.clear();
        self.animated.clear();
        self.focus = None;
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    /// Current window, if any slides exist.
    pub fn range(&self) -> Option<RangeInclusive<usize>> {
        match (self.focus, self.slides.len()) {
            (Some(focus), len) if len > 0 => Some(window_range(focus, len)),
            _ => None,
        }
    }

    pub fn materialized_indices(&self) -> Vec<usize> {
        self.slides
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.is_materialized().then_some(i))
            .collect()
    }

    pub fn is_in_flight(&self, index: usize) -> bool {
        self.in_flight.contains(&index)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn has_playbacks(&self) -> bool {
        !self.playbacks.is_empty()
    }

    /// Evict outside the window around `focus`, then fill empty slots inside it.
    ///
    /// Idempotent: a repeated call with the same focus neither evicts nor
    /// submits anything.
    pub fn materialize_around(&mut self, focus: usize, queue: &dyn DecodeQueue, now: Instant) {
        if self.slides.is_empty() {
            return;
        }
        let focus = focus.min(self.slides.len() - 1);
        let range = window_range(focus, self.slides.len());
        self.focus = Some(focus);

        for (index, slide) in self.slides.iter_mut().enumerate() {
            if !range.contains(&index) && slide.visual.take().is_some() {
                trace!("Evict #{}", index);
            }
        }
        self.playbacks.retain(|index, _| range.contains(index));

        for index in range {
            let slide = &self.slides[index];
            if !slide.is_placeable()
                || slide.is_materialized()
                || self.in_flight.contains(&index)
                || self.failed.contains(&index)
            {
                continue;
            }

            let path = slide.path.clone();
            let target = slide.geometry.size();
            let backend = &self.backend;
            let animated = *self
                .animated
                .entry(index)
                .or_insert_with(|| backend.is_animated(&path));

            if animated {
                self.open_animation(index, now);
            } else {
                self.in_flight.insert(index);
                queue.submit(DecodeRequest { index, path, target });
            }
        }
    }

    fn open_animation(&mut self, index: usize, now: Instant) {
        let slide = &self.slides[index];
        let playback = match self.backend.open_animation(&slide.path, slide.geometry.size()) {
            Ok(frames) => AnimatedPlayback::start(frames, now),
            Err(e) => {
                debug!("Animation open failed #{} {}: {}", index, slide.path.display(), e);
                None
            }
        };
        let Some(playback) = playback else {
            self.failed.insert(index);
            return;
        };
        debug!("Animated #{}: {} frames", index, playback.frame_count());
        let bitmap = playback.current_image().clone();
        self.attach(index, bitmap);
        self.playbacks.insert(index, playback);
    }

    /// Handle a completed decode. Returns true if a visual was attached.
    ///
    /// The caller has already dropped results from older epochs.
    pub fn on_decoded(&mut self, result: DecodeResult) -> bool {
        let index = result.index;
        self.in_flight.remove(&index);

        let bitmap = match result.bitmap {
            Ok(bitmap) => bitmap,
            Err(e) => {
                debug!("Slot #{} stays blank: {}", index, e);
                self.failed.insert(index);
                return false;
            }
        };

        let in_window = self.range().is_some_and(|r| r.contains(&index));
        if !in_window {
            debug!("Discard decode #{}: outside window {:?}", index, self.range());
            return false;
        }
        if self.slides[index].is_materialized() {
            debug!("Discard decode #{}: already materialized", index);
            return false;
        }

        self.attach(index, bitmap);
        true
    }

    fn attach(&mut self, index: usize, bitmap: RgbaImage) {
        self.next_revision += 1;
        let slide = &mut self.slides[index];
        slide.visual = Some(Visual {
            bitmap,
            origin: (slide.geometry.x, slide.geometry.y),
            revision: self.next_revision,
        });
    }

    /// Advance animated slides. Returns true if any visible frame changed.
    pub fn advance_playbacks(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for (&index, playback) in self.playbacks.iter_mut() {
            if !playback.advance(now) {
                continue;
            }
            self.next_revision += 1;
            if let Some(visual) = self.slides[index].visual.as_mut() {
                visual.bitmap = playback.current_image().clone();
                visual.revision = self.next_revision;
                changed = true;
            }
        }
        changed
    }
}
