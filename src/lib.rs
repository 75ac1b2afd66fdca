//! stripview - image viewer with a virtualized panorama strip
//!
//! Re-exports all modules for use by the binary target.

// Core infrastructure (workers, timers, events)
pub mod core;

// Geometry and media I/O
pub mod entities;

// Strip engine
pub mod strip;

// App modules
pub mod app;
pub mod cli;
pub mod config;
pub mod utils;
pub mod widgets;

// Re-export commonly used types
pub use crate::core::{EventBus, EventEmitter, downcast_event};
pub use crate::entities::{FsBackend, MediaBackend};
pub use crate::strip::{DecodePipeline, PanoramaEngine, ScrollSurface};
