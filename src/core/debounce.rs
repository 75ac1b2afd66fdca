//! Restartable single-shot timer driven by the presentation loop.
//!
//! The engine keeps one `Debouncer` per concern (scroll inference, resize,
//! post-navigation settle) so that restarting one never disturbs another.
//! Scheduling while pending resets the deadline instead of stacking.
//!
//! Time is passed in explicitly; the loop calls [`Debouncer::poll`] every
//! frame with the frame's `Instant`.

use std::time::{Duration, Instant};

/// Single-shot timer carrying a payload.
///
/// # Usage
/// ```ignore
/// // On every scroll event:
/// tracker_timer.schedule((), now);
///
/// // In the update loop:
/// if tracker_timer.poll(now).is_some() {
///     infer_index_from_offset();
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    name: &'static str,
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(name: &'static str, delay: Duration) -> Self {
        Self {
            name,
            delay,
            pending: None,
        }
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm (or re-arm) the timer to fire `delay` after `now`.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
        log::trace!("{}: scheduled in {}ms", self.name, self.delay.as_millis());
    }

    /// Disarm without firing.
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            log::trace!("{}: cancelled", self.name);
        }
    }

    /// Fire if the deadline has passed. Clears the pending state when it fires.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => {
                log::trace!("{}: fired", self.name);
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_value(&self) -> Option<&T> {
        self.pending.as_ref().map(|(value, _)| value)
    }

    /// When the timer will fire, if armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_no_trigger_before_delay() {
        let t0 = Instant::now();
        let mut timer = Debouncer::new("test", ms(40));
        timer.schedule(7, t0);
        assert!(timer.is_pending());
        assert_eq!(timer.poll(t0 + ms(39)), None);
        assert!(timer.is_pending());
    }

    #[test]
    fn test_trigger_after_delay_is_single_shot() {
        let t0 = Instant::now();
        let mut timer = Debouncer::new("test", ms(40));
        timer.schedule(7, t0);
        assert_eq!(timer.poll(t0 + ms(40)), Some(7));
        assert!(!timer.is_pending());
        assert_eq!(timer.poll(t0 + ms(100)), None);
    }

    #[test]
    fn test_reschedule_resets_deadline_and_payload() {
        let t0 = Instant::now();
        let mut timer = Debouncer::new("test", ms(80));
        timer.schedule(1, t0);
        timer.schedule(2, t0 + ms(60));

        assert_eq!(timer.poll(t0 + ms(100)), None);
        assert_eq!(timer.pending_value(), Some(&2));
        assert_eq!(timer.poll(t0 + ms(140)), Some(2));
    }

    #[test]
    fn test_cancel() {
        let t0 = Instant::now();
        let mut timer = Debouncer::new("test", ms(10));
        timer.schedule((), t0);
        timer.cancel();
        assert_eq!(timer.poll(t0 + ms(50)), None);
        assert_eq!(timer.deadline(), None);
    }
}
