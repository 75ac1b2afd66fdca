//! Standard mode: the focused item alone, scaled by the fit mode.

use eframe::egui;
use log::{debug, warn};
use std::path::{Path, PathBuf};

use super::textures::color_image;
use crate::entities::{Loader, Size};
use crate::strip::FitMode;

/// Display scale for an image of `image` pixels in a `viewport` of points.
pub fn fit_scale(fit: FitMode, image: Size, viewport: egui::Vec2) -> f32 {
    if image.is_empty() || viewport.x <= 0.0 || viewport.y <= 0.0 {
        return 1.0;
    }
    let sx = viewport.x / image.width as f32;
    let sy = viewport.y / image.height as f32;
    match fit {
        FitMode::Inside => sx.min(sy),
        FitMode::ToWidth => sx,
        FitMode::ToHeight => sy,
    }
}

/// Loaded state of the standard view.
#[derive(Default)]
pub struct SingleImage {
    path: Option<PathBuf>,
    texture: Option<egui::TextureHandle>,
    size: Size,
    error: Option<String>,
    /// Pan inside an image larger than the panel, in points.
    pan: egui::Vec2,
}

impl std::fmt::Debug for SingleImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleImage")
            .field("path", &self.path)
            .field("size", &self.size)
            .field("error", &self.error)
            .finish()
    }
}

impl SingleImage {
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Show `path`, decoding it if it is not already loaded.
    pub fn show(&mut self, ctx: &egui::Context, path: &Path) {
        if self.path.as_deref() == Some(path) {
            return;
        }
        self.path = Some(path.to_path_buf());
        self.pan = egui::Vec2::ZERO;
        match Loader::decode(path) {
            Ok(bitmap) => {
                debug!("Standard view: {} ({}x{})", path.display(), bitmap.width(), bitmap.height());
                self.size = Size::new(bitmap.width(), bitmap.height());
                self.texture = Some(ctx.load_texture(
                    "single_image",
                    color_image(&bitmap),
                    egui::TextureOptions::LINEAR,
                ));
                self.error = None;
            }
            Err(e) => {
                warn!("Cannot display {}: {}", path.display(), e);
                self.texture = None;
                self.size = Size::default();
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Paint into `rect`; drag pans when the scaled image overflows.
    pub fn render(&mut self, ui: &mut egui::Ui, rect: egui::Rect, fit: FitMode) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, egui::Color32::BLACK);

        let Some(texture) = &self.texture else {
            let text = match (&self.error, &self.path) {
                (Some(e), _) => e.as_str(),
                (None, Some(_)) => "",
                (None, None) => "Drop images or a folder here",
            };
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                text,
                egui::FontId::proportional(16.0),
                egui::Color32::GRAY,
            );
            return;
        };

        let scale = fit_scale(fit, self.size, rect.size());
        let shown = egui::vec2(self.size.width as f32 * scale, self.size.height as f32 * scale);
        let slack = ((shown - rect.size()) * 0.5).max(egui::Vec2::ZERO);

        let response = ui.interact(rect, ui.id().with("single_image_pan"), egui::Sense::drag());
        if response.dragged() {
            self.pan += response.drag_delta();
        }
        self.pan = self.pan.clamp(-slack, slack);

        let image_rect = egui::Rect::from_center_size(rect.center() + self.pan, shown);
        painter.image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }
}
