//! GPU textures for materialized slides, keyed by slide index.
//!
//! A visual's revision changes whenever its bitmap does (rebuilds, animation
//! frames), so a matching revision means the upload can be reused.

use eframe::egui;
use std::collections::HashMap;

use crate::strip::Visual;

#[derive(Default)]
pub struct TextureCache {
    entries: HashMap<usize, (u64, egui::TextureHandle)>,
}

impl std::fmt::Debug for TextureCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureCache")
            .field("textures", &self.entries.len())
            .finish()
    }
}

pub fn color_image(bitmap: &image::RgbaImage) -> egui::ColorImage {
    egui::ColorImage::from_rgba_unmultiplied(
        [bitmap.width() as usize, bitmap.height() as usize],
        bitmap.as_raw(),
    )
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texture for slide `index`, uploading only if the revision moved.
    pub fn texture_for(
        &mut self,
        ctx: &egui::Context,
        index: usize,
        visual: &Visual,
    ) -> &egui::TextureHandle {
        let entry = self.entries.entry(index);
        let (revision, handle) = entry.or_insert_with(|| {
            let handle = ctx.load_texture(
                format!("slide_{index}"),
                color_image(&visual.bitmap),
                egui::TextureOptions::LINEAR,
            );
            (visual.revision, handle)
        });
        if *revision != visual.revision {
            handle.set(color_image(&visual.bitmap), egui::TextureOptions::LINEAR);
            *revision = visual.revision;
        }
        handle
    }

    /// Drop textures whose slides no longer hold a visual.
    pub fn retain(&mut self, mut live: impl FnMut(usize) -> bool) {
        self.entries.retain(|&index, _| live(index));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
