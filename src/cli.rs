use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::StripSettings;
use crate::strip::{FitMode, LayoutOrder, TransitionEffect};

const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Decode: image 0.25 (png, jpeg, gif, webp, tiff, tga, bmp)\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FitArg {
    /// Whole image inside the window
    Inside,
    /// Fit to width (vertical strip in panorama)
    Width,
    /// Fit to height (horizontal strip in panorama)
    Height,
}

impl From<FitArg> for FitMode {
    fn from(arg: FitArg) -> Self {
        match arg {
            FitArg::Inside => FitMode::Inside,
            FitArg::Width => FitMode::ToWidth,
            FitArg::Height => FitMode::ToHeight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EffectArg {
    None,
    Slide,
}

impl From<EffectArg> for TransitionEffect {
    fn from(arg: EffectArg) -> Self {
        match arg {
            EffectArg::None => TransitionEffect::None,
            EffectArg::Slide => TransitionEffect::Slide,
        }
    }
}

/// Image viewer with a panorama strip mode
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Images to show, in order
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Index of the first image to show (0-based)
    #[arg(long = "start", value_name = "N")]
    pub start: Option<usize>,

    /// Start in panorama mode
    #[arg(short = 'p', long = "panorama")]
    pub panorama: bool,

    /// Initial fit mode
    #[arg(long = "fit", value_enum, value_name = "MODE")]
    pub fit: Option<FitArg>,

    /// Lay the strip out right-to-left (bottom-to-top)
    #[arg(short = 'b', long = "backward")]
    pub backward: bool,

    /// Navigation transition
    #[arg(long = "effect", value_enum, value_name = "EFFECT")]
    pub effect: Option<EffectArg>,

    /// Start autoplay, optionally with an interval in seconds
    #[arg(short = 'a', long = "autoplay", value_name = "SECS")]
    pub autoplay: Option<Option<f64>>,

    /// Decode worker threads
    #[arg(short = 't', long = "threads", value_name = "N")]
    pub threads: Option<usize>,

    /// Enable logging to file (default: stripview.log in the data directory)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

impl Args {
    /// Fold command-line overrides into the loaded settings.
    pub fn apply_to(&self, settings: &mut StripSettings) {
        if let Some(fit) = self.fit {
            // An explicit fit also replaces the remembered strip fit.
            settings.fit_mode = fit.into();
            settings.panorama_fit_mode = None;
        }
        if self.panorama {
            settings.panorama = true;
        }
        if self.backward {
            settings.layout_order = LayoutOrder::Backward;
        }
        if let Some(effect) = self.effect {
            settings.effect = effect.into();
        }
        if let Some(Some(secs)) = self.autoplay {
            settings.autoplay_secs = secs;
        }
        if let Some(threads) = self.threads {
            settings.decode_threads = Some(threads);
        }
    }

    pub fn autoplay_requested(&self) -> bool {
        self.autoplay.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let args = Args::try_parse_from([
            "stripview", "a.png", "b.png", "--start", "1", "--panorama", "--fit", "height",
            "--backward", "--effect", "none", "--autoplay", "1.5", "--threads", "2", "-vv",
        ])
        .unwrap();
        assert_eq!(args.files.len(), 2);
        assert_eq!(args.start, Some(1));
        assert_eq!(args.verbosity, 2);

        let mut settings = StripSettings::default();
        args.apply_to(&mut settings);
        assert_eq!(settings.fit_mode, FitMode::ToHeight);
        assert_eq!(settings.layout_order, LayoutOrder::Backward);
        assert_eq!(settings.effect, TransitionEffect::None);
        assert_eq!(settings.autoplay_secs, 1.5);
        assert_eq!(settings.decode_threads, Some(2));
        assert!(settings.panorama);
    }

    #[test]
    fn test_explicit_fit_replaces_saved_strip_fit() {
        let mut settings = StripSettings {
            panorama: true,
            panorama_fit_mode: Some(FitMode::ToWidth),
            ..StripSettings::default()
        };
        let args = Args::try_parse_from(["stripview", "--fit", "height"]).unwrap();
        args.apply_to(&mut settings);
        assert_eq!(settings.fit_mode, FitMode::ToHeight);
        assert_eq!(settings.panorama_fit_mode, None);
        // No --panorama: the saved mode is kept.
        assert!(settings.panorama);

        let args = Args::try_parse_from(["stripview"]).unwrap();
        let mut fresh = StripSettings::default();
        args.apply_to(&mut fresh);
        assert!(!fresh.panorama);
    }

    #[test]
    fn test_bare_autoplay_keeps_interval() {
        let args = Args::try_parse_from(["stripview", "--autoplay"]).unwrap();
        assert!(args.autoplay_requested());
        let mut settings = StripSettings::default();
        args.apply_to(&mut settings);
        assert_eq!(settings.autoplay_secs, 3.0);
    }

    #[test]
    fn test_bad_fit_rejected() {
        assert!(Args::try_parse_from(["stripview", "--fit", "diagonal"]).is_err());
    }
}
