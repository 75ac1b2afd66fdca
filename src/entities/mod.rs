//! Entities - geometry primitives and media I/O
//!
//! Plain data and image loading, free of engine state and UI.

pub mod geometry;
pub mod loader;
pub mod media;

pub use geometry::{Canvas, Direction, Rect, Size};
pub use loader::{AnimationFrame, LoadError, Loader};
pub use media::{FsBackend, MediaBackend};
