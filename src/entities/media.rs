//! Media backend seam between the strip engine and image I/O.
//!
//! The engine never touches files directly. Layout asks for native sizes,
//! the window manager for animation detection and frames, and decode
//! workers for scaled bitmaps. Tests substitute an in-memory backend.

use image::RgbaImage;
use log::debug;
use std::path::Path;

use super::geometry::Size;
use super::loader::{AnimationFrame, LoadError, Loader};

/// Image I/O used by the strip engine. Shared with decode workers, hence `Send + Sync`.
pub trait MediaBackend: Send + Sync {
    /// Native pixel size, or `None` when the source cannot be read.
    fn native_size(&self, path: &Path) -> Option<Size>;

    /// Whether the source should be played as a multi-frame animation.
    fn is_animated(&self, path: &Path) -> bool;

    /// Decode and scale to exactly `target` (runs on a worker thread).
    fn decode_scaled(&self, path: &Path, target: Size) -> Result<RgbaImage, LoadError>;

    /// Decode all animation frames scaled to `target` (runs on the presentation thread).
    fn open_animation(&self, path: &Path, target: Size) -> Result<Vec<AnimationFrame>, LoadError>;
}

/// Filesystem backend over [`Loader`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FsBackend;

impl MediaBackend for FsBackend {
    fn native_size(&self, path: &Path) -> Option<Size> {
        match Loader::dimensions(path) {
            Ok(size) if !size.is_empty() => Some(size),
            Ok(_) => None,
            Err(e) => {
                debug!("Cannot read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn is_animated(&self, path: &Path) -> bool {
        Loader::is_animated(path)
    }

    fn decode_scaled(&self, path: &Path, target: Size) -> Result<RgbaImage, LoadError> {
        Loader::decode_scaled(path, target)
    }

    fn open_animation(&self, path: &Path, target: Size) -> Result<Vec<AnimationFrame>, LoadError> {
        Loader::animation_frames(path, target)
    }
}
