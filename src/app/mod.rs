//! Application module - StripApp and related functionality.
//!
//! This module organizes the desktop application into focused submodules:
//! - `events` - Event bus handling and keyboard/wheel input
//! - `run` - `eframe::App` frame loop, toolbar, status line
//! - `autoplay` - interval driver for slideshow mode
//! - `input` - raw egui input helpers

mod autoplay;
mod events;
mod input;
mod run;

pub use autoplay::Autoplay;

use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::config::StripSettings;
use crate::core::EventBus;
use crate::entities::MediaBackend;
use crate::strip::{DecodeQueue, PanoramaEngine, ViewState};
use crate::widgets::viewer::{EguiSurface, SingleImage, TextureCache};
use input::WheelAccumulator;

/// Startup choices resolved from CLI + settings.
#[derive(Debug, Clone, Default)]
pub struct Launch {
    pub files: Vec<PathBuf>,
    pub start: Option<usize>,
    pub panorama: bool,
    pub autoplay: bool,
}

/// Main application state.
pub struct StripApp {
    pub engine: PanoramaEngine<EguiSurface>,
    pub event_bus: EventBus,
    pub textures: TextureCache,
    pub single: SingleImage,
    pub autoplay: Autoplay,
    pub settings: StripSettings,
    /// Where `settings` is written back when the view state changes.
    pub settings_path: Option<PathBuf>,
    /// Last known view state (toolbar sync).
    pub view_state: ViewState,
    /// "3 / 20  name.png" for the status line.
    pub status_text: String,
    wheel: WheelAccumulator,
}

impl std::fmt::Debug for StripApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripApp")
            .field("engine", &self.engine)
            .field("view_state", &self.view_state)
            .field("autoplay", &self.autoplay)
            .finish()
    }
}

impl StripApp {
    pub fn new(
        backend: Arc<dyn MediaBackend>,
        decoder: Box<dyn DecodeQueue>,
        settings: StripSettings,
        settings_path: Option<PathBuf>,
        launch: Launch,
    ) -> Self {
        let event_bus = EventBus::new();
        let engine = PanoramaEngine::new(
            EguiSurface::new(),
            backend,
            decoder,
            event_bus.emitter(),
            &settings.engine_options(),
        );
        let mut app = Self {
            view_state: engine.view_state(),
            engine,
            event_bus,
            textures: TextureCache::new(),
            single: SingleImage::default(),
            autoplay: Autoplay::new(settings.autoplay_interval()),
            settings,
            settings_path,
            status_text: String::new(),
            wheel: WheelAccumulator::default(),
        };

        let now = Instant::now();
        info!("Starting with {} files", launch.files.len());
        app.engine.set_list(launch.files, launch.start, now);
        if launch.panorama {
            app.engine.enter_panorama(now);
        }
        if launch.autoplay {
            app.autoplay.start(now);
        }
        app
    }

    /// Replace the list (drag-and-drop), keeping the current mode.
    pub fn load_files(&mut self, files: Vec<PathBuf>, now: Instant) {
        if files.is_empty() {
            return;
        }
        self.textures.clear();
        self.single.clear();
        self.engine.set_list(files, None, now);
        self.autoplay.postpone(now);
    }

    /// Persist view mode, fit modes, order, effect and autoplay interval.
    pub fn save_settings(&self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        if let Err(e) = self.settings.save(path) {
            warn!("Settings not saved: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::testing::{FakeBackend, ManualDecoder};
    use crate::strip::{FitMode, ViewMode};
    use eframe::egui;

    fn app(settings: StripSettings) -> StripApp {
        let launch = Launch {
            panorama: settings.panorama,
            ..Launch::default()
        };
        StripApp::new(Arc::new(FakeBackend::new()), Box::new(ManualDecoder::new()), settings, None, launch)
    }

    #[test]
    fn test_saved_panorama_state_restored() {
        let settings = StripSettings {
            panorama: true,
            panorama_fit_mode: Some(FitMode::ToHeight),
            ..StripSettings::default()
        };
        let app = app(settings);
        assert!(app.engine.is_panorama());
        assert_eq!(app.engine.view_state().fit_mode, FitMode::ToHeight);
    }

    #[test]
    fn test_view_changes_recorded_in_settings() {
        let ctx = egui::Context::default();
        let mut app = app(StripSettings::default());
        let now = Instant::now();

        app.engine.enter_panorama(now);
        app.engine.set_fit_mode(FitMode::ToHeight, now);
        app.handle_events(&ctx);
        assert_eq!(app.view_state.mode, ViewMode::Panorama);
        assert!(app.settings.panorama);
        assert_eq!(app.settings.panorama_fit_mode, Some(FitMode::ToHeight));
        assert_eq!(app.settings.fit_mode, FitMode::Inside);

        app.engine.leave_panorama(now);
        app.handle_events(&ctx);
        assert!(!app.settings.panorama);
        assert_eq!(app.settings.panorama_fit_mode, Some(FitMode::ToHeight));
    }
}
