//! Autoplay driver: a fixed-interval tick that advances the strip.
//!
//! Owned by the app, not the engine; the engine only sees `advance()`.

use log::debug;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Autoplay {
    interval: Duration,
    last_tick_time: Option<Instant>,
}

impl Autoplay {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_tick_time: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.last_tick_time.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn start(&mut self, now: Instant) {
        if !self.is_playing() {
            debug!("Autoplay on ({:.1}s)", self.interval.as_secs_f64());
            self.last_tick_time = Some(now);
        }
    }

    pub fn stop(&mut self) {
        if self.is_playing() {
            debug!("Autoplay off");
            self.last_tick_time = None;
        }
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.is_playing() {
            self.stop();
        } else {
            self.start(now);
        }
    }

    /// Restart the interval (manual navigation shouldn't be followed by an instant tick).
    pub fn postpone(&mut self, now: Instant) {
        if self.is_playing() {
            self.last_tick_time = Some(now);
        }
    }

    /// Instant of the next tick while playing.
    pub fn next_tick(&self) -> Option<Instant> {
        self.last_tick_time.map(|t| t + self.interval)
    }

    /// True once per elapsed interval. Missed intervals collapse into one tick.
    pub fn update(&mut self, now: Instant) -> bool {
        match self.next_tick() {
            Some(due) if now >= due => {
                self.last_tick_time = Some(now);
                true
            }
            _ => false,
        }
    }
}
