//! Application paths and the settings file.
//!
//! Directory priority:
//! 1. `--config-dir` argument
//! 2. `STRIPVIEW_CONFIG_DIR` environment variable
//! 3. Current directory, if it already holds `stripview.json` or `stripview.log`
//! 4. Platform directory from `dirs-next` (`~/.config/stripview`, `~/.local/share/stripview`, ...)

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::strip::{EngineOptions, FitMode, LayoutOrder, TransitionEffect};

pub const APP_DIR: &str = "stripview";
pub const SETTINGS_FILE: &str = "stripview.json";
pub const LOG_FILE: &str = "stripview.log";
pub const CONFIG_DIR_ENV: &str = "STRIPVIEW_CONFIG_DIR";

/// Overrides for the default application directories.
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom directory (from CLI or ENV); used for both config and data.
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// CLI argument first, then the environment variable.
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from));
        Self { config_dir }
    }
}

/// Path of a configuration file.
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::config_dir).join(name)
}

/// Path of a data file (logs).
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::data_dir).join(name)
}

/// Create config and data directories if missing.
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = resolve_dir(config, dirs_next::config_dir);
    let data_dir = resolve_dir(config, dirs_next::data_dir);

    for dir in [&config_dir, &data_dir] {
        if !dir.exists() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
    }
    Ok(())
}

fn has_local_files(dir: &Path) -> bool {
    [SETTINGS_FILE, LOG_FILE].iter().any(|f| dir.join(f).exists())
}

fn resolve_dir(config: &PathConfig, platform: fn() -> Option<PathBuf>) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }
    if let Ok(cwd) = std::env::current_dir()
        && has_local_files(&cwd)
    {
        return cwd;
    }
    platform()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Viewer settings (`stripview.json`).
///
/// Every field has a default, so partial files are fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripSettings {
    pub effect: TransitionEffect,
    pub transition_ms: u64,
    pub settle_ms: u64,
    pub scroll_debounce_ms: u64,
    pub resize_debounce_ms: u64,
    /// Decode threads; `None` = 3/4 of the CPUs.
    pub decode_threads: Option<usize>,
    pub autoplay_secs: f64,
    pub zoom_step_percent: u32,
    /// Standard-mode fit.
    pub fit_mode: FitMode,
    pub layout_order: LayoutOrder,
    /// Start in the panorama strip.
    pub panorama: bool,
    /// Last fit used in the strip; `None` derives it from `fit_mode`.
    pub panorama_fit_mode: Option<FitMode>,
}

impl Default for StripSettings {
    fn default() -> Self {
        Self {
            effect: TransitionEffect::Slide,
            transition_ms: 250,
            settle_ms: 50,
            scroll_debounce_ms: 40,
            resize_debounce_ms: 80,
            decode_threads: None,
            autoplay_secs: 3.0,
            zoom_step_percent: 5,
            fit_mode: FitMode::Inside,
            layout_order: LayoutOrder::Forward,
            panorama: false,
            panorama_fit_mode: None,
        }
    }
}

impl StripSettings {
    /// Load from `path`. Missing file gives defaults; a broken one logs a warning and gives defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => {
                info!("Settings loaded from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("Ignoring settings file: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Worker count, at least one.
    pub fn decode_threads(&self) -> usize {
        self.decode_threads
            .unwrap_or_else(|| num_cpus::get() * 3 / 4)
            .max(1)
    }

    pub fn autoplay_interval(&self) -> Duration {
        Duration::from_secs_f64(self.autoplay_secs.max(0.1))
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            effect: self.effect,
            transition: Duration::from_millis(self.transition_ms),
            settle: Duration::from_millis(self.settle_ms),
            scroll_debounce: Duration::from_millis(self.scroll_debounce_ms),
            resize_debounce: Duration::from_millis(self.resize_debounce_ms),
            zoom_step: f64::from(self.zoom_step_percent) / 100.0,
            fit_mode: self.fit_mode,
            layout_order: self.layout_order,
            panorama_fit_mode: self.panorama_fit_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_dir_wins() {
        let config = PathConfig {
            config_dir: Some(PathBuf::from("/custom")),
        };
        assert_eq!(config_file("a.json", &config), PathBuf::from("/custom/a.json"));
        assert_eq!(data_file(LOG_FILE, &config), PathBuf::from("/custom/stripview.log"));
    }

    #[test]
    fn test_cli_beats_env() {
        let config = PathConfig::from_env_and_cli(Some(PathBuf::from("/from-cli")));
        assert_eq!(config.config_dir, Some(PathBuf::from("/from-cli")));
    }

    #[test]
    fn test_ensure_dirs_creates_custom_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("cfg");
        let config = PathConfig {
            config_dir: Some(dir.clone()),
        };
        ensure_dirs(&config).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_defaults_match_engine_defaults() {
        let settings = StripSettings::default();
        assert_eq!(settings.engine_options(), EngineOptions::default());
        assert!(settings.decode_threads() >= 1);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{ "effect": "none", "fit_mode": "height", "decode_threads": 0 }"#).unwrap();

        let settings = StripSettings::load_or_default(&path);
        assert_eq!(settings.effect, TransitionEffect::None);
        assert_eq!(settings.fit_mode, FitMode::ToHeight);
        assert_eq!(settings.transition_ms, 250);
        assert_eq!(settings.decode_threads(), 1);
    }

    #[test]
    fn test_broken_or_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(SETTINGS_FILE);
        assert_eq!(StripSettings::load_or_default(&path), StripSettings::default());

        std::fs::write(&path, "{ not json").unwrap();
        assert!(StripSettings::load(&path).is_err());
        assert_eq!(StripSettings::load_or_default(&path), StripSettings::default());
    }

    #[test]
    fn test_save_load_keeps_values() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(SETTINGS_FILE);
        let settings = StripSettings {
            autoplay_secs: 1.5,
            layout_order: LayoutOrder::Backward,
            ..StripSettings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(StripSettings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_panorama_state_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(SETTINGS_FILE);
        let settings = StripSettings {
            panorama: true,
            panorama_fit_mode: Some(FitMode::ToHeight),
            ..StripSettings::default()
        };
        settings.save(&path).unwrap();

        let loaded = StripSettings::load_or_default(&path);
        assert!(loaded.panorama);
        assert_eq!(loaded.engine_options().panorama_fit_mode, Some(FitMode::ToHeight));
        assert_eq!(loaded.engine_options().fit_mode, FitMode::Inside);
    }

    #[test]
    fn test_older_file_without_panorama_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{ "fit_mode": "width" }"#).unwrap();

        let settings = StripSettings::load_or_default(&path);
        assert!(!settings.panorama);
        assert_eq!(settings.panorama_fit_mode, None);
    }
}
