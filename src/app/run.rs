//! Main application loop - eframe::App implementation.
//!
//! Contains the update() method that runs each frame:
//! - Input handling
//! - Autoplay tick and engine update
//! - Event processing
//! - UI rendering (toolbar, status line, viewer)
//! - Repaint scheduling

use eframe::egui;
use log::trace;
use std::time::{Duration, Instant};

use crate::app::StripApp;
use crate::entities::Direction;
use crate::strip::{FitMode, LayoutOrder, ScrollSurface, TransitionEffect};
use crate::widgets::viewer::render_strip;

/// Poll rate while decodes are in flight and nothing else animates.
const BUSY_REPAINT: Duration = Duration::from_millis(16);

fn fit_label(fit: FitMode) -> &'static str {
    match fit {
        FitMode::Inside => "Fit inside",
        FitMode::ToWidth => "Fit width",
        FitMode::ToHeight => "Fit height",
    }
}

impl eframe::App for StripApp {
    /// Main frame update - called every frame by eframe.
    ///
    /// Flow:
    /// 1. Dropped files, keys, wheel
    /// 2. Autoplay tick
    /// 3. Engine update (decode results, transitions, inference, resize)
    /// 4. Events -> status line, title, settings
    /// 5. Render
    /// 6. Schedule the next repaint
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.handle_input(ctx, now);

        if self.autoplay.update(now) && !self.engine.is_empty() {
            trace!("Autoplay tick");
            self.engine.advance(now);
        }

        let changed = self.engine.update(now);
        self.handle_events(ctx);

        self.render_toolbar(ctx, now);
        self.render_status(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if self.engine.is_panorama() {
                    render_strip(ui, &mut self.engine, &mut self.textures, now);
                } else {
                    let rect = ui.max_rect();
                    if let Some(path) = self.engine.current_path() {
                        let path = path.to_path_buf();
                        self.single.show(ui.ctx(), &path);
                    }
                    self.single.render(ui, rect, self.view_state.fit_mode);
                }
            });

        if changed || self.engine.is_navigating() {
            ctx.request_repaint();
        } else if self.engine.has_pending_work() {
            ctx.request_repaint_after(BUSY_REPAINT);
        }
        if let Some(next) = self.autoplay.next_tick() {
            ctx.request_repaint_after(next.saturating_duration_since(now));
        }
    }
}

impl StripApp {
    fn render_toolbar(&mut self, ctx: &egui::Context, now: Instant) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let panorama = self.engine.is_panorama();
                if ui
                    .selectable_label(panorama, "Panorama")
                    .on_hover_text("Toggle panorama strip (P)")
                    .clicked()
                {
                    self.engine.toggle_panorama(now);
                }

                let fit = self.view_state.fit_mode;
                egui::ComboBox::from_id_salt("fit_mode")
                    .selected_text(fit_label(fit))
                    .show_ui(ui, |ui| {
                        for option in [FitMode::Inside, FitMode::ToWidth, FitMode::ToHeight] {
                            // Panorama has no inside fit.
                            if panorama && option == FitMode::Inside {
                                continue;
                            }
                            if ui.selectable_label(fit == option, fit_label(option)).clicked() {
                                self.set_fit_mode(option, now);
                            }
                        }
                    });

                let backward = self.view_state.layout_order == LayoutOrder::Backward;
                let order_label = match (self.view_state.direction, backward) {
                    (Direction::Horizontal, false) => "→",
                    (Direction::Horizontal, true) => "←",
                    (Direction::Vertical, false) => "↓",
                    (Direction::Vertical, true) => "↑",
                };
                if ui
                    .add_enabled(panorama, egui::Button::new(order_label))
                    .on_hover_text("Layout order (O)")
                    .clicked()
                {
                    self.engine.toggle_layout_order(now);
                }

                let sliding = self.engine.effect() == TransitionEffect::Slide;
                if ui
                    .selectable_label(sliding, "Slide")
                    .on_hover_text("Animated transitions (E)")
                    .clicked()
                {
                    self.toggle_effect();
                }

                ui.separator();

                let playing = self.autoplay.is_playing();
                if ui
                    .selectable_label(playing, if playing { "⏸ Autoplay" } else { "▶ Autoplay" })
                    .on_hover_text("Slideshow (Space)")
                    .clicked()
                {
                    self.autoplay.toggle(now);
                }
                let mut secs = self.settings.autoplay_secs;
                let response = ui.add(
                    egui::DragValue::new(&mut secs)
                        .range(0.5..=60.0)
                        .speed(0.1)
                        .suffix(" s"),
                );
                if response.changed() {
                    self.settings.autoplay_secs = secs;
                    self.autoplay.set_interval(self.settings.autoplay_interval());
                }
                if response.drag_stopped() || response.lost_focus() {
                    self.save_settings();
                }

                if panorama {
                    ui.separator();
                    ui.label(format!("{:.0}%", self.engine.surface().scale() * 100.0));
                }
            });
        });
    }

    fn render_status(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.engine.is_empty() {
                    ui.label("No images");
                } else {
                    ui.label(&self.status_text);
                }
                if let Some(e) = self.single.error()
                    && !self.engine.is_panorama()
                {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, e);
                }
            });
        });
    }
}
