//! Viewer widget - panorama strip and single-image view
//!
//! egui painter over the strip engine; textures are uploaded per slide

mod single;
mod surface;
mod textures;
mod viewer_ui;

pub use single::{SingleImage, fit_scale};
pub use surface::EguiSurface;
pub use textures::TextureCache;
pub use viewer_ui::render_strip;
