//! Event handling for StripApp.
//!
//! Contains handlers for:
//! - Event bus events (handle_events)
//! - Keyboard, wheel and dropped-file input (handle_input)

use super::StripApp;
use super::input::{nav_key, zoom_notches};
use crate::core::{CurrentItemChangedEvent, ViewStateChangedEvent, downcast_event};
use crate::strip::{FitMode, TransitionEffect, ViewMode};
use crate::utils::media::expand_inputs;

use eframe::egui;
use log::{debug, trace};
use std::path::PathBuf;
use std::time::Instant;

impl StripApp {
    /// Handle events from event bus.
    pub fn handle_events(&mut self, ctx: &egui::Context) {
        for event in self.event_bus.poll() {
            if let Some(e) = downcast_event::<CurrentItemChangedEvent>(&event) {
                trace!("Current item {:?} -> {}", e.previous, e.index);
                self.status_text = format!("{} / {}  {}", e.index + 1, self.engine.len(), e.display_name);
                ctx.send_viewport_cmd(egui::ViewportCommand::Title(format!(
                    "{} - stripview",
                    e.display_name
                )));
                continue;
            }
            if let Some(ViewStateChangedEvent(state)) = downcast_event::<ViewStateChangedEvent>(&event) {
                debug!("View state: {:?}", state);
                if state.mode == ViewMode::Standard {
                    self.textures.clear();
                } else {
                    self.single.clear();
                }
                self.view_state = *state;
                self.settings.layout_order = state.layout_order;
                self.settings.panorama = state.mode == ViewMode::Panorama;
                match state.mode {
                    ViewMode::Standard => self.settings.fit_mode = state.fit_mode,
                    ViewMode::Panorama => self.settings.panorama_fit_mode = Some(state.fit_mode),
                }
                self.save_settings();
                continue;
            }
        }
    }

    /// Keyboard shortcuts, wheel stepping/zoom and dropped files.
    pub fn handle_input(&mut self, ctx: &egui::Context, now: Instant) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw.dropped_files.iter().filter_map(|f| f.path.clone()).collect()
        });
        if !dropped.is_empty() {
            let files = expand_inputs(&dropped);
            debug!("Dropped {} paths -> {} files", dropped.len(), files.len());
            self.load_files(files, now);
        }

        if ctx.wants_keyboard_input() {
            return;
        }

        let (key, scroll_y, zoom_delta, shortcuts) = ctx.input(|i| {
            let shortcuts = Shortcuts {
                panorama: i.key_pressed(egui::Key::P) || i.key_pressed(egui::Key::Enter),
                fit: i.key_pressed(egui::Key::F),
                order: i.key_pressed(egui::Key::O),
                effect: i.key_pressed(egui::Key::E),
                autoplay: i.key_pressed(egui::Key::Space),
                leave: i.key_pressed(egui::Key::Escape),
            };
            (nav_key(i), i.raw_scroll_delta.y, i.zoom_delta(), shortcuts)
        });

        if let Some(key) = key
            && self.engine.handle_key(key, now)
        {
            self.autoplay.postpone(now);
        }

        let zoom = zoom_notches(zoom_delta);
        if zoom != 0 {
            self.wheel.reset();
            // Engine convention: wheel down (+) zooms out.
            self.engine.handle_wheel(-zoom, true, now);
        } else {
            let steps = self.wheel.feed(scroll_y);
            if steps != 0 {
                self.engine.handle_wheel(steps, false, now);
                self.autoplay.postpone(now);
            }
        }

        if shortcuts.panorama {
            self.engine.toggle_panorama(now);
        }
        if shortcuts.leave {
            self.engine.leave_panorama(now);
        }
        if shortcuts.fit {
            self.engine.cycle_fit_mode(now);
        }
        if shortcuts.order {
            self.engine.toggle_layout_order(now);
        }
        if shortcuts.effect {
            self.toggle_effect();
        }
        if shortcuts.autoplay {
            self.autoplay.toggle(now);
        }
    }

    pub fn toggle_effect(&mut self) {
        let effect = match self.engine.effect() {
            TransitionEffect::None => TransitionEffect::Slide,
            TransitionEffect::Slide => TransitionEffect::None,
        };
        self.engine.set_effect(effect);
        self.settings.effect = effect;
        self.save_settings();
    }

    pub fn set_fit_mode(&mut self, fit_mode: FitMode, now: Instant) {
        self.engine.set_fit_mode(fit_mode, now);
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Shortcuts {
    panorama: bool,
    fit: bool,
    order: bool,
    effect: bool,
    autoplay: bool,
    leave: bool,
}
