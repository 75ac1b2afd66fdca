//! Time-driven helpers ticked by the presentation loop.
//!
//! - [`ScrollTransition`]: eased scroll from one offset to another
//! - [`AnimatedPlayback`]: looping frame sequence of an animated image
//!
//! Neither owns a timer thread; both take `now` from the caller.

use image::RgbaImage;
use std::time::{Duration, Instant};

use crate::entities::AnimationFrame;

/// Quadratic ease-out: fast start, gentle arrival.
pub fn ease_out_quad(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * (2.0 - t)
}

/// Bounded-duration eased scroll of one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollTransition {
    from: f64,
    to: f64,
    started: Instant,
    duration: Duration,
}

impl ScrollTransition {
    pub fn new(from: f64, to: f64, started: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started,
            duration,
        }
    }

    /// Destination offset.
    pub fn target(&self) -> f64 {
        self.to
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Eased offset at `now`; exactly `target()` once finished.
    pub fn value_at(&self, now: Instant) -> f64 {
        if self.is_finished(now) {
            return self.to;
        }
        self.from + (self.to - self.from) * ease_out_quad(self.progress(now))
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

/// Looping playback of pre-scaled animation frames.
///
/// Dropping the playback disposes the frames; there is nothing else to stop.
#[derive(Debug)]
pub struct AnimatedPlayback {
    frames: Vec<AnimationFrame>,
    current: usize,
    next_at: Instant,
}

impl AnimatedPlayback {
    /// Start at frame 0. `None` for an empty sequence.
    pub fn start(frames: Vec<AnimationFrame>, now: Instant) -> Option<Self> {
        let first_delay = frames.first()?.delay;
        Some(Self {
            frames,
            current: 0,
            next_at: now + first_delay,
        })
    }

    pub fn frame_index(&self) -> usize {
        self.current
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn current_image(&self) -> &RgbaImage {
        &self.frames[self.current].image
    }

    /// When the next frame is due.
    pub fn next_deadline(&self) -> Instant {
        self.next_at
    }

    /// Step to the frame due at `now`. Returns true if the visible frame changed.
    ///
    /// A late tick catches up by at most one full loop so a stalled loop
    /// does not spin through thousands of frames.
    pub fn advance(&mut self, now: Instant) -> bool {
        if self.frames.len() < 2 || now < self.next_at {
            return false;
        }
        let mut steps = 0;
        while now >= self.next_at && steps < self.frames.len() {
            self.current = (self.current + 1) % self.frames.len();
            self.next_at += self.frames[self.current].delay;
            steps += 1;
        }
        if now >= self.next_at {
            self.next_at = now + self.frames[self.current].delay;
        }
        true
    }
}
