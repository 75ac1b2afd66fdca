//! Viewer widget - UI rendering

use eframe::egui;
use std::time::Instant;

use super::{EguiSurface, TextureCache};
use crate::entities::Direction;
use crate::strip::{PanoramaEngine, ScrollSurface};

const PLACEHOLDER: egui::Color32 = egui::Color32::from_gray(24);
const SCROLL_TRACK: egui::Color32 = egui::Color32::from_gray(48);
const SCROLL_THUMB: egui::Color32 = egui::Color32::from_gray(140);

/// Render the panorama strip inside the provided UI.
///
/// Feeds panel size changes and drag scrolling back to the engine, then
/// paints every on-screen slide: a texture if materialized, a dark
/// placeholder otherwise.
pub fn render_strip(
    ui: &mut egui::Ui,
    engine: &mut PanoramaEngine<EguiSurface>,
    textures: &mut TextureCache,
    now: Instant,
) {
    let panel_rect = ui.max_rect();

    if engine.surface_mut().set_viewport(panel_rect.size()) {
        engine.on_viewport_resized(now);
    }

    let response = ui.interact(
        panel_rect,
        ui.id().with("strip_interaction"),
        egui::Sense::drag(),
    );
    if response.dragged() {
        let moved = engine.surface_mut().pan(response.drag_delta());
        for axis in moved {
            engine.on_scroll_changed(axis, now);
        }
    }

    let ctx = ui.ctx().clone();
    let painter = ui.painter_at(panel_rect);
    painter.rect_filled(panel_rect, 0.0, egui::Color32::BLACK);

    let surface = engine.surface();
    let scale = surface.scale() as f32;
    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));

    for (index, slide) in engine.slides().iter().enumerate() {
        if !slide.is_placeable() {
            continue;
        }
        let g = slide.geometry;
        let min = surface.to_screen(panel_rect.min, g.x, g.y);
        let slide_rect =
            egui::Rect::from_min_size(min, egui::vec2(g.width as f32 * scale, g.height as f32 * scale));
        if !slide_rect.intersects(panel_rect) {
            continue;
        }
        match &slide.visual {
            Some(visual) => {
                let texture = textures.texture_for(&ctx, index, visual);
                painter.image(texture.id(), slide_rect, uv, egui::Color32::WHITE);
            }
            None => {
                painter.rect_filled(slide_rect.shrink(1.0), 0.0, PLACEHOLDER);
            }
        }
    }

    let slides = engine.slides();
    textures.retain(|index| slides.get(index).is_some_and(|s| s.visual.is_some()));

    if let Some(layout) = engine.layout() {
        paint_scroll_indicator(&painter, panel_rect, surface, layout.direction);
    }
}

/// Thin position bar along the strip's axis.
fn paint_scroll_indicator(
    painter: &egui::Painter,
    panel: egui::Rect,
    surface: &EguiSurface,
    direction: Direction,
) {
    let max = surface.max_offset(direction);
    if max <= 0.0 {
        return;
    }
    let extent = f64::from(surface.viewport_size().along(direction));
    let content = max + extent;
    let visible = (extent / content) as f32;
    let start = (surface.offset(direction) / content) as f32;

    const THICKNESS: f32 = 4.0;
    let (track, thumb) = match direction {
        Direction::Horizontal => {
            let track = egui::Rect::from_min_max(
                egui::pos2(panel.left(), panel.bottom() - THICKNESS),
                panel.right_bottom(),
            );
            let x0 = track.left() + start * track.width();
            let thumb = egui::Rect::from_min_max(
                egui::pos2(x0, track.top()),
                egui::pos2(x0 + visible * track.width(), track.bottom()),
            );
            (track, thumb)
        }
        Direction::Vertical => {
            let track = egui::Rect::from_min_max(
                egui::pos2(panel.right() - THICKNESS, panel.top()),
                panel.right_bottom(),
            );
            let y0 = track.top() + start * track.height();
            let thumb = egui::Rect::from_min_max(
                egui::pos2(track.left(), y0),
                egui::pos2(track.right(), y0 + visible * track.height()),
            );
            (track, thumb)
        }
    };
    painter.rect_filled(track, 0.0, SCROLL_TRACK);
    painter.rect_filled(thumb, 2.0, SCROLL_THUMB);
}
