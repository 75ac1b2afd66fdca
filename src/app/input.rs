//! Raw egui input to engine gestures.

use eframe::egui;

use crate::strip::NavKey;

/// Scroll distance (points) that counts as one wheel notch.
pub const NOTCH: f32 = 50.0;

/// Turns smooth scroll deltas into whole wheel notches.
///
/// Mouse wheels deliver one notch at a time; touchpads deliver many small
/// deltas that have to add up first.
#[derive(Debug, Default, Clone)]
pub struct WheelAccumulator {
    pending: f32,
}

impl WheelAccumulator {
    /// Feed egui's vertical scroll delta (positive = wheel up).
    /// Returns notches in wheel-down-positive convention.
    pub fn feed(&mut self, delta_y: f32) -> i32 {
        if delta_y == 0.0 {
            return 0;
        }
        if delta_y.signum() != self.pending.signum() {
            self.pending = 0.0;
        }
        self.pending += delta_y;
        let notches = (self.pending / NOTCH).trunc();
        self.pending -= notches * NOTCH;
        -(notches as i32)
    }

    pub fn reset(&mut self) {
        self.pending = 0.0;
    }
}

/// Navigation key pressed this frame, if any.
pub fn nav_key(input: &egui::InputState) -> Option<NavKey> {
    [
        (egui::Key::ArrowLeft, NavKey::Left),
        (egui::Key::ArrowRight, NavKey::Right),
        (egui::Key::ArrowUp, NavKey::Up),
        (egui::Key::ArrowDown, NavKey::Down),
        (egui::Key::Home, NavKey::Home),
        (egui::Key::End, NavKey::End),
    ]
    .into_iter()
    .find(|(key, _)| input.key_pressed(*key))
    .map(|(_, nav)| nav)
}

/// Zoom notches from a pinch / Ctrl+wheel factor (positive = zoom in).
pub fn zoom_notches(zoom_delta: f32) -> i32 {
    if zoom_delta > 1.0 {
        1
    } else if zoom_delta < 1.0 {
        -1
    } else {
        0
    }
}
