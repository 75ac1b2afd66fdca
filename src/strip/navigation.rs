//! Navigation controller state: logical target, programmatic-scroll flag,
//! scroll transition, and the post-navigation settle delay.
//!
//! While a navigation is programmatic the logical target is the source of
//! truth for the current index, and offset-based inference is suppressed.
//! Each new navigation discards the previous transition and restarts the
//! settle delay, so a burst of steps compounds against the pending target.

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::animation::ScrollTransition;
use crate::core::Debouncer;

/// How the viewport travels to a new index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionEffect {
    /// Jump straight to the target offset.
    None,
    /// Eased scroll over the transition duration.
    #[default]
    Slide,
}

/// Result of one [`Navigator::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NavTick {
    /// Offset to apply on the primary axis this frame.
    pub offset: Option<f64>,
    /// The settle delay elapsed; programmatic scrolling is over.
    pub settled: bool,
}

#[derive(Debug)]
pub struct Navigator {
    logical_target: Option<usize>,
    programmatic: bool,
    transition: Option<ScrollTransition>,
    settle: Debouncer<()>,
    effect: TransitionEffect,
    duration: Duration,
}

impl Navigator {
    pub fn new(effect: TransitionEffect, duration: Duration, settle_delay: Duration) -> Self {
        Self {
            logical_target: None,
            programmatic: false,
            transition: None,
            settle: Debouncer::new("nav-settle", settle_delay),
            effect,
            duration,
        }
    }

    pub fn effect(&self) -> TransitionEffect {
        self.effect
    }

    pub fn set_effect(&mut self, effect: TransitionEffect) {
        self.effect = effect;
    }

    pub fn logical_target(&self) -> Option<usize> {
        self.logical_target
    }

    pub fn is_programmatic(&self) -> bool {
        self.programmatic
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Programmatic phase or live transition: offset inference must stay out.
    pub fn is_busy(&self) -> bool {
        self.programmatic || self.transition.is_some()
    }

    /// Index that the next relative step starts from.
    pub fn base_index(&self, committed: usize) -> usize {
        self.logical_target.unwrap_or(committed)
    }

    /// Start navigating to `index`.
    ///
    /// Returns the offset to apply right away when there is no animation to
    /// run (effect `None`, `animate == false`, or already at the target).
    pub fn begin(&mut self, index: usize, from: f64, to: f64, animate: bool, now: Instant) -> Option<f64> {
        self.logical_target = Some(index);
        self.programmatic = true;
        self.settle.cancel();
        if self.transition.take().is_some() {
            trace!("Navigation: previous transition discarded");
        }

        let slide = animate
            && self.effect == TransitionEffect::Slide
            && !self.duration.is_zero()
            && (to - from).abs() >= 0.5;
        if slide {
            debug!("Navigation -> #{} ({:.0} -> {:.0}, {}ms)", index, from, to, self.duration.as_millis());
            self.transition = Some(ScrollTransition::new(from, to, now, self.duration));
            None
        } else {
            debug!("Navigation -> #{} (instant, offset {:.0})", index, to);
            self.settle.schedule((), now);
            Some(to)
        }
    }

    /// Advance the transition and settle timer.
    pub fn tick(&mut self, now: Instant) -> NavTick {
        if let Some(transition) = &self.transition {
            let offset = transition.value_at(now);
            if transition.is_finished(now) {
                self.transition = None;
                self.settle.schedule((), now);
            }
            return NavTick {
                offset: Some(offset),
                settled: false,
            };
        }
        if self.settle.poll(now).is_some() {
            trace!("Navigation settled at {:?}", self.logical_target);
            self.logical_target = None;
            self.programmatic = false;
            return NavTick {
                offset: None,
                settled: true,
            };
        }
        NavTick::default()
    }

    /// Abort everything (leaving panorama, list swap).
    pub fn reset(&mut self) {
        self.logical_target = None;
        self.programmatic = false;
        self.transition = None;
        self.settle.cancel();
    }

    /// Cut a live transition short, returning its target offset.
    pub fn finish_now(&mut self, now: Instant) -> Option<f64> {
        let target = self.transition.take().map(|t| t.target());
        if target.is_some() {
            self.settle.schedule((), now);
        }
        target
    }
}
