//! Mode coordinator: `{mode, fit mode, direction, layout order}` as one tuple.
//!
//! Direction is derived from the fit mode in panorama (`ToHeight` gives a
//! horizontal strip, `ToWidth` a vertical one). The scroll-signal
//! subscription is an explicit object owned here and rebuilt on every
//! orientation change, so a stale scrollbar can never feed the tracker.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::layout::LayoutOrder;
use crate::entities::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewMode {
    /// One image at a time.
    #[default]
    Standard,
    /// All images on one scrollable strip.
    Panorama,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Whole image inside the viewport (standard mode only).
    #[default]
    Inside,
    #[serde(rename = "width")]
    ToWidth,
    #[serde(rename = "height")]
    ToHeight,
}

impl FitMode {
    /// Strip direction implied by this fit mode, if any.
    pub fn direction(self) -> Option<Direction> {
        match self {
            FitMode::Inside => None,
            FitMode::ToHeight => Some(Direction::Horizontal),
            FitMode::ToWidth => Some(Direction::Vertical),
        }
    }

    /// The nearest mode legal in panorama.
    pub fn for_panorama(self) -> Self {
        match self {
            FitMode::Inside => FitMode::ToWidth,
            other => other,
        }
    }

    /// Next mode in the cycle `Inside -> ToHeight -> ToWidth -> Inside`.
    ///
    /// Panorama skips `Inside`.
    pub fn cycled(self, mode: ViewMode) -> Self {
        match (self, mode) {
            (FitMode::Inside, _) => FitMode::ToHeight,
            (FitMode::ToHeight, _) => FitMode::ToWidth,
            (FitMode::ToWidth, ViewMode::Standard) => FitMode::Inside,
            (FitMode::ToWidth, ViewMode::Panorama) => FitMode::ToHeight,
        }
    }
}

/// Snapshot published to the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewState {
    pub mode: ViewMode,
    pub fit_mode: FitMode,
    pub direction: Direction,
    pub layout_order: LayoutOrder,
}

/// Connection between the tracker and one scrollbar axis.
///
/// Dropped and recreated on every orientation change; the token tells
/// subscriptions apart even when the axis is the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSubscription {
    pub axis: Direction,
    pub token: u64,
}

/// What a coordinator transition requires from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeChange {
    /// Any field of the view state changed.
    pub changed: bool,
    /// Strip geometry must be recomputed.
    pub relayout: bool,
}

impl ModeChange {
    const NONE: Self = Self {
        changed: false,
        relayout: false,
    };
}

#[derive(Debug)]
pub struct ModeCoordinator {
    state: ViewState,
    standard_fit: FitMode,
    panorama_fit: Option<FitMode>,
    subscription: Option<ScrollSubscription>,
    next_token: u64,
}

impl ModeCoordinator {
    pub fn new(fit_mode: FitMode, layout_order: LayoutOrder) -> Self {
        Self {
            state: ViewState {
                mode: ViewMode::Standard,
                fit_mode,
                direction: fit_mode.direction().unwrap_or_default(),
                layout_order,
            },
            standard_fit: fit_mode,
            panorama_fit: None,
            subscription: None,
            next_token: 0,
        }
    }

    /// Seed the remembered panorama fit (restored settings). `Inside` becomes `ToWidth`.
    pub fn with_panorama_fit(mut self, fit_mode: Option<FitMode>) -> Self {
        self.panorama_fit = fit_mode.map(FitMode::for_panorama);
        self
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn is_panorama(&self) -> bool {
        self.state.mode == ViewMode::Panorama
    }

    pub fn direction(&self) -> Direction {
        self.state.direction
    }

    pub fn layout_order(&self) -> LayoutOrder {
        self.state.layout_order
    }

    pub fn subscription(&self) -> Option<ScrollSubscription> {
        self.subscription
    }

    /// True if a scroll signal on `axis` should reach the tracker.
    pub fn accepts(&self, axis: Direction) -> bool {
        self.subscription.is_some_and(|s| s.axis == axis)
    }

    fn resubscribe(&mut self) {
        if let Some(old) = self.subscription.take() {
            debug!("Scroll subscription #{} ({:?}) dropped", old.token, old.axis);
        }
        if self.is_panorama() {
            self.next_token += 1;
            let sub = ScrollSubscription {
                axis: self.state.direction,
                token: self.next_token,
            };
            debug!("Scroll subscription #{} on {:?}", sub.token, sub.axis);
            self.subscription = Some(sub);
        }
    }

    fn apply_fit(&mut self, fit_mode: FitMode) -> ModeChange {
        let before = self.state;
        self.state.fit_mode = fit_mode;
        if let Some(direction) = fit_mode.direction() {
            self.state.direction = direction;
        }
        let direction_changed = before.direction != self.state.direction;
        if direction_changed {
            self.resubscribe();
        }
        ModeChange {
            changed: before != self.state,
            relayout: self.is_panorama() && direction_changed,
        }
    }

    /// Enter panorama, restoring the last panorama fit mode.
    pub fn enter_panorama(&mut self) -> ModeChange {
        if self.is_panorama() {
            return ModeChange::NONE;
        }
        self.standard_fit = self.state.fit_mode;
        let fit = self
            .panorama_fit
            .unwrap_or(self.state.fit_mode)
            .for_panorama();

        self.state.mode = ViewMode::Panorama;
        self.state.fit_mode = fit;
        self.state.direction = fit.direction().unwrap_or_default();
        self.resubscribe();
        info!("Panorama on: {:?} {:?}", self.state.direction, self.state.layout_order);
        ModeChange {
            changed: true,
            relayout: true,
        }
    }

    /// Back to standard, restoring the last standard fit mode.
    pub fn leave_panorama(&mut self) -> ModeChange {
        if !self.is_panorama() {
            return ModeChange::NONE;
        }
        self.panorama_fit = Some(self.state.fit_mode);
        self.state.mode = ViewMode::Standard;
        self.resubscribe();
        let restored = self.standard_fit;
        self.apply_fit(restored);
        info!("Panorama off");
        ModeChange {
            changed: true,
            relayout: false,
        }
    }

    pub fn cycle_fit_mode(&mut self) -> ModeChange {
        let next = self.state.fit_mode.cycled(self.state.mode);
        self.apply_fit(next)
    }

    /// Set a fit mode directly; `Inside` becomes `ToWidth` in panorama.
    pub fn set_fit_mode(&mut self, fit_mode: FitMode) -> ModeChange {
        let fit_mode = if self.is_panorama() {
            fit_mode.for_panorama()
        } else {
            fit_mode
        };
        self.apply_fit(fit_mode)
    }

    pub fn toggle_layout_order(&mut self) -> ModeChange {
        self.state.layout_order = self.state.layout_order.toggled();
        debug!("Layout order -> {:?}", self.state.layout_order);
        ModeChange {
            changed: true,
            relayout: self.is_panorama(),
        }
    }
}
