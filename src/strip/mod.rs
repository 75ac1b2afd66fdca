//! Panorama strip engine.
//!
//! Lays an ordered list of images end to end on one scrollable canvas and
//! keeps only a small window of them decoded. Everything here runs on the
//! presentation thread except the decode jobs.
//!
//! Data flow:
//! ```text
//! ModeCoordinator ──relayout──> layout::compute ──> SlideWindow::rebuild
//!        │                                              │
//!        └── scroll subscription ──> ScrollTracker ──> materialize_around <── Navigator
//!                                                       │
//!                                     DecodeQueue <─────┘ (results drained in update)
//! ```
//!
//! While the navigator is busy (transition or settle delay) its logical
//! target owns the current index; the tracker only takes over once it has
//! settled. All timers take `now` from the caller.

pub mod animation;
pub mod decode;
pub mod layout;
pub mod mode;
pub mod navigation;
pub mod surface;
pub mod tracker;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

pub use decode::{DecodePipeline, DecodeQueue, DecodeRequest, DecodeResult};
pub use layout::{LayoutOrder, StripLayout};
pub use mode::{FitMode, ModeChange, ViewMode, ViewState};
pub use navigation::TransitionEffect;
pub use surface::ScrollSurface;
pub use window::{Slide, Visual, WINDOW_RADIUS};

use log::{debug, info, trace};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::{CurrentItemChangedEvent, Debouncer, EventEmitter, ViewStateChangedEvent};
use crate::entities::{Direction, MediaBackend, Rect, Size};
use mode::ModeCoordinator;
use navigation::Navigator;
use tracker::{ScrollTracker, nearest_index, scene_coordinate};
use window::SlideWindow;

/// Zoom limits for the strip.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 4.0;

/// Engine tuning, usually built from the settings file.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub effect: TransitionEffect,
    pub transition: Duration,
    pub settle: Duration,
    pub scroll_debounce: Duration,
    pub resize_debounce: Duration,
    /// Zoom increment per wheel notch, as a fraction (0.05 = 5%).
    pub zoom_step: f64,
    pub fit_mode: FitMode,
    /// Fit used on the first panorama entry; `None` derives it from `fit_mode`.
    pub panorama_fit_mode: Option<FitMode>,
    pub layout_order: LayoutOrder,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            effect: TransitionEffect::Slide,
            transition: Duration::from_millis(250),
            settle: Duration::from_millis(50),
            scroll_debounce: Duration::from_millis(40),
            resize_debounce: Duration::from_millis(80),
            zoom_step: 0.05,
            fit_mode: FitMode::Inside,
            panorama_fit_mode: None,
            layout_order: LayoutOrder::Forward,
        }
    }
}

/// Keyboard navigation input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

pub struct PanoramaEngine<S: ScrollSurface> {
    surface: S,
    backend: Arc<dyn MediaBackend>,
    decoder: Box<dyn DecodeQueue>,
    window: SlideWindow,
    navigator: Navigator,
    tracker: ScrollTracker,
    coordinator: ModeCoordinator,
    emitter: EventEmitter,
    paths: Vec<PathBuf>,
    /// Native sizes, read on first layout and kept for the list's lifetime.
    natives: Option<Vec<Option<Size>>>,
    current: usize,
    layout: Option<StripLayout>,
    resize: Debouncer<Size>,
    laid_out_for: Option<Size>,
    zoom_step: f64,
}

impl<S: ScrollSurface> std::fmt::Debug for PanoramaEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanoramaEngine")
            .field("items", &self.paths.len())
            .field("current", &self.current)
            .field("state", &self.coordinator.state())
            .field("window", &self.window)
            .field("navigator", &self.navigator)
            .finish()
    }
}

impl<S: ScrollSurface> PanoramaEngine<S> {
    pub fn new(
        surface: S,
        backend: Arc<dyn MediaBackend>,
        decoder: Box<dyn DecodeQueue>,
        emitter: EventEmitter,
        options: &EngineOptions,
    ) -> Self {
        Self {
            surface,
            window: SlideWindow::new(Arc::clone(&backend)),
            backend,
            decoder,
            navigator: Navigator::new(options.effect, options.transition, options.settle),
            tracker: ScrollTracker::new(options.scroll_debounce),
            coordinator: ModeCoordinator::new(options.fit_mode, options.layout_order)
                .with_panorama_fit(options.panorama_fit_mode),
            emitter,
            paths: Vec::new(),
            natives: None,
            current: 0,
            layout: None,
            resize: Debouncer::new("resize", options.resize_debounce),
            laid_out_for: None,
            zoom_step: options.zoom_step,
        }
    }

    // ---- Accessors ----

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn view_state(&self) -> ViewState {
        self.coordinator.state()
    }

    pub fn is_panorama(&self) -> bool {
        self.coordinator.is_panorama()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Focused index; `None` for an empty list.
    pub fn current_index(&self) -> Option<usize> {
        (!self.paths.is_empty()).then_some(self.current)
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.paths.get(self.current).map(PathBuf::as_path)
    }

    pub fn layout(&self) -> Option<&StripLayout> {
        self.layout.as_ref()
    }

    pub fn slides(&self) -> &[Slide] {
        self.window.slides()
    }

    pub fn materialized_indices(&self) -> Vec<usize> {
        self.window.materialized_indices()
    }

    pub fn logical_target(&self) -> Option<usize> {
        self.navigator.logical_target()
    }

    pub fn is_navigating(&self) -> bool {
        self.navigator.is_busy()
    }

    pub fn effect(&self) -> TransitionEffect {
        self.navigator.effect()
    }

    pub fn set_effect(&mut self, effect: TransitionEffect) {
        self.navigator.set_effect(effect);
    }

    /// Something is still in motion and wants further `update` calls.
    pub fn has_pending_work(&self) -> bool {
        self.navigator.is_busy()
            || self.tracker.is_pending()
            || self.resize.is_pending()
            || self.window.in_flight_count() > 0
            || self.window.has_playbacks()
    }

    // ---- List ----

    /// Swap the active list, focusing `preferred` (clamped) or the first item.
    pub fn set_list(&mut self, paths: Vec<PathBuf>, preferred: Option<usize>, now: Instant) {
        self.navigator.reset();
        self.tracker.halt();
        self.window.clear();
        self.decoder.bump_epoch();
        self.layout = None;
        self.laid_out_for = None;
        self.natives = None;
        self.paths = paths;
        self.current = preferred.unwrap_or(0).min(self.paths.len().saturating_sub(1));
        info!("List: {} items, starting at #{}", self.paths.len(), self.current);

        self.notify(None);
        if self.is_panorama() {
            self.rebuild(now);
        }
    }

    fn notify(&self, previous: Option<usize>) {
        if let Some(path) = self.paths.get(self.current) {
            self.emitter
                .emit(CurrentItemChangedEvent::new(self.current, previous, path.clone()));
        }
    }

    fn commit(&mut self, index: usize) {
        let previous = self.current;
        self.current = index;
        if previous != index {
            self.notify(Some(previous));
        }
    }

    // ---- Layout ----

    /// Recompute geometry for the current viewport and re-navigate to the
    /// current index. Returns false if the viewport is empty.
    fn rebuild(&mut self, now: Instant) -> bool {
        self.decoder.bump_epoch();
        self.window.clear();
        self.resize.cancel();

        let (paths, backend) = (&self.paths, &self.backend);
        let natives = self.natives.get_or_insert_with(|| {
            let started = Instant::now();
            let natives: Vec<Option<Size>> = paths.iter().map(|p| backend.native_size(p)).collect();
            debug!("Read {} headers in {}ms", natives.len(), started.elapsed().as_millis());
            natives
        });

        let viewport = self.surface.viewport_size();
        let state = self.coordinator.state();
        let Some(layout) = layout::compute(natives, viewport, state.direction, state.layout_order) else {
            self.layout = None;
            self.laid_out_for = None;
            return false;
        };

        info!(
            "Strip: {} items ({} placed), {:?} {:?}, canvas {}x{}",
            layout.len(),
            layout.placed_count(),
            state.direction,
            state.layout_order,
            layout.canvas.width,
            layout.canvas.height
        );
        self.window.rebuild(&self.paths, &layout);
        self.surface.set_canvas(layout.canvas);
        self.layout = Some(layout);
        self.laid_out_for = Some(viewport);

        if !self.paths.is_empty() {
            self.navigate(self.current, false, now);
        }
        true
    }

    // ---- Navigation ----

    fn navigate(&mut self, index: usize, animate: bool, now: Instant) {
        let Some(layout) = &self.layout else {
            return;
        };
        let Some(rect) = layout.geometries.get(index).copied() else {
            return;
        };
        let direction = layout.direction;

        self.tracker.halt();
        self.window.materialize_around(index, self.decoder.as_ref(), now);

        let scale = self.surface.scale();
        let extent = f64::from(self.surface.viewport_size().along(direction));
        let to = rect.center(direction) * scale - extent / 2.0;
        let from = self.surface.offset(direction);
        if let Some(offset) = self.navigator.begin(index, from, to, animate, now) {
            self.surface.set_offset(direction, offset);
        }
    }

    /// Make `index` current and bring it to the viewport center.
    pub fn scroll_to_image(&mut self, index: usize, now: Instant) {
        if index >= self.paths.len() {
            debug!("scroll_to_image: #{} out of range ({})", index, self.paths.len());
            return;
        }
        if self.is_panorama() {
            self.navigate(index, true, now);
        }
        self.commit(index);
    }

    /// Step `delta` items from the pending target (or the current index), wrapping.
    ///
    /// In panorama, unreadable placeholders are passed over in the direction
    /// of travel; if nothing is placeable the focus stays put.
    pub fn step_by_image(&mut self, delta: isize, now: Instant) {
        let len = self.paths.len();
        if len == 0 {
            return;
        }
        let wrap = |i: isize| i.rem_euclid(len as isize) as usize;
        let base = self.navigator.base_index(self.current);
        let mut next = wrap(base as isize + delta);

        if let Some(layout) = &self.layout {
            let step = if delta < 0 { -1 } else { 1 };
            let mut skipped = 0;
            while layout.geometries.get(next).is_some_and(Rect::is_empty) {
                skipped += 1;
                if skipped >= len {
                    debug!("Step {:+}: no placeable item", delta);
                    return;
                }
                next = wrap(next as isize + step);
            }
            if skipped > 0 {
                debug!("Step {:+}: skipped {} unreadable item(s)", delta, skipped);
            }
        }

        trace!("Step {:+} from #{} -> #{}", delta, base, next);
        self.scroll_to_image(next, now);
    }

    /// Autoplay tick.
    pub fn advance(&mut self, now: Instant) {
        self.step_by_image(1, now);
    }

    /// External selection (list click, slider).
    pub fn select_index(&mut self, index: usize, now: Instant) {
        self.scroll_to_image(index, now);
    }

    // ---- Mode ----

    fn apply_mode_change(&mut self, change: ModeChange, now: Instant) {
        if !change.changed {
            return;
        }
        self.emitter.emit(ViewStateChangedEvent(self.coordinator.state()));
        if change.relayout {
            self.rebuild(now);
        }
    }

    pub fn enter_panorama(&mut self, now: Instant) {
        let change = self.coordinator.enter_panorama();
        self.apply_mode_change(change, now);
    }

    pub fn leave_panorama(&mut self, now: Instant) {
        let change = self.coordinator.leave_panorama();
        if !change.changed {
            return;
        }
        self.navigator.reset();
        self.tracker.halt();
        self.resize.cancel();
        self.decoder.bump_epoch();
        self.window.clear();
        self.layout = None;
        self.laid_out_for = None;
        self.apply_mode_change(change, now);
    }

    pub fn toggle_panorama(&mut self, now: Instant) {
        if self.is_panorama() {
            self.leave_panorama(now);
        } else {
            self.enter_panorama(now);
        }
    }

    pub fn cycle_fit_mode(&mut self, now: Instant) {
        let change = self.coordinator.cycle_fit_mode();
        self.apply_mode_change(change, now);
    }

    pub fn set_fit_mode(&mut self, fit_mode: FitMode, now: Instant) {
        let change = self.coordinator.set_fit_mode(fit_mode);
        self.apply_mode_change(change, now);
    }

    pub fn toggle_layout_order(&mut self, now: Instant) {
        let change = self.coordinator.toggle_layout_order();
        self.apply_mode_change(change, now);
    }

    // ---- Surface signals ----

    /// Viewport size may have changed; relayout after the resize debounce.
    pub fn on_viewport_resized(&mut self, now: Instant) {
        if !self.is_panorama() {
            return;
        }
        let size = self.surface.viewport_size();
        if self.laid_out_for == Some(size) {
            self.resize.cancel();
            return;
        }
        self.resize.schedule(size, now);
    }

    /// Scroll offset changed on `axis` (user drag, scrollbar, or our own writes).
    pub fn on_scroll_changed(&mut self, axis: Direction, now: Instant) {
        if self.is_panorama() && self.coordinator.accepts(axis) {
            self.tracker.on_scroll(now);
        }
    }

    // ---- Input ----

    /// Wheel input; `steps > 0` is wheel down. With `zoom`, wheel up zooms in.
    pub fn handle_wheel(&mut self, steps: i32, zoom: bool, now: Instant) {
        if steps == 0 {
            return;
        }
        if zoom {
            self.zoom_by(-steps, now);
        } else {
            self.step_by_image(steps.signum() as isize, now);
        }
    }

    /// Arrow/Home/End. Returns false if the key means nothing in this state.
    ///
    /// In panorama only the strip's own axis steps, and backward order flips
    /// the sign so the picture moves the way the arrow points.
    pub fn handle_key(&mut self, key: NavKey, now: Instant) -> bool {
        let len = self.paths.len();
        if len == 0 {
            return false;
        }
        let panorama = self.is_panorama();
        let state = self.coordinator.state();
        let horizontal = state.direction == Direction::Horizontal;

        let delta: isize = match key {
            NavKey::Home => {
                self.select_index(0, now);
                return true;
            }
            NavKey::End => {
                self.select_index(len - 1, now);
                return true;
            }
            NavKey::Left | NavKey::Up if !panorama => -1,
            NavKey::Right | NavKey::Down if !panorama => 1,
            NavKey::Left if horizontal => -1,
            NavKey::Right if horizontal => 1,
            NavKey::Up if !horizontal => -1,
            NavKey::Down if !horizontal => 1,
            _ => return false,
        };
        let sign = if panorama { state.layout_order.sign() } else { 1 };
        self.step_by_image(delta * sign, now);
        true
    }

    /// Zoom by `steps` increments, keeping the scene point at the viewport
    /// center fixed. Returns the new scale.
    pub fn zoom_by(&mut self, steps: i32, now: Instant) -> f64 {
        let old = self.surface.scale();
        if !self.is_panorama() || steps == 0 {
            return old;
        }
        let new = (old + f64::from(steps) * self.zoom_step).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new - old).abs() < 1e-9 {
            return old;
        }

        // Anchor on the destination, not on a mid-transition frame.
        if let Some(offset) = self.navigator.finish_now(now) {
            self.surface.set_offset(self.coordinator.direction(), offset);
        }

        let viewport = self.surface.viewport_size();
        for axis in [Direction::Horizontal, Direction::Vertical] {
            let extent = f64::from(viewport.along(axis));
            let center = scene_coordinate(self.surface.offset(axis), extent, old);
            self.surface.set_offset(axis, center * new - extent / 2.0);
        }
        self.surface.set_scale(new);
        debug!("Zoom {:.0}% -> {:.0}%", old * 100.0, new * 100.0);
        new
    }

    // ---- Frame loop ----

    /// Run one presentation-loop step. Returns true if anything visible changed.
    ///
    /// Order: decode results, navigation, offset inference, resize, playback.
    pub fn update(&mut self, now: Instant) -> bool {
        let mut repaint = false;

        let epoch = self.decoder.current_epoch();
        for result in self.decoder.drain() {
            if result.epoch != epoch {
                trace!("Stale decode #{} (epoch {} != {})", result.index, result.epoch, epoch);
                continue;
            }
            repaint |= self.window.on_decoded(result);
        }

        let tick = self.navigator.tick(now);
        if let Some(offset) = tick.offset {
            self.surface.set_offset(self.coordinator.direction(), offset);
            repaint = true;
        }
        if tick.settled {
            // Re-arm: catches any user scroll that was dropped mid-navigation.
            self.tracker.on_scroll(now);
        }

        if self.tracker.poll(now, self.navigator.is_busy()) {
            repaint |= self.infer_index(now);
        }

        if let Some(size) = self.resize.poll(now) {
            debug!("Resize settled at {}x{}", size.width, size.height);
            if self.is_panorama() {
                self.rebuild(now);
                repaint = true;
            }
        }

        repaint |= self.window.advance_playbacks(now);
        repaint
    }

    fn infer_index(&mut self, now: Instant) -> bool {
        let Some(layout) = &self.layout else {
            return false;
        };
        let direction = layout.direction;
        let extent = f64::from(self.surface.viewport_size().along(direction));
        let coord = scene_coordinate(self.surface.offset(direction), extent, self.surface.scale());
        // A placeholder reached by selection sits exactly on its seam; keep it.
        if layout
            .geometries
            .get(self.current)
            .is_some_and(|r| r.is_empty() && (r.center(direction) - coord).abs() < 1.0)
        {
            return false;
        }
        let Some(index) = nearest_index(&layout.geometries, direction, coord) else {
            return false;
        };
        if index == self.current {
            return false;
        }
        debug!("Scroll inference: #{} -> #{}", self.current, index);
        self.window.materialize_around(index, self.decoder.as_ref(), now);
        self.commit(index);
        true
    }
}
