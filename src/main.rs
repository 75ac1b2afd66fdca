use stripview::app::{Launch, StripApp};
use stripview::cli::Args;
use stripview::config::{self, StripSettings};
use stripview::entities::{FsBackend, MediaBackend};
use stripview::strip::DecodePipeline;
use stripview::utils::media::expand_inputs;

use clap::Parser;
use eframe::egui;
use log::{debug, info, warn};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments first (needed for log setup)
    let args = Args::parse();

    // Create path configuration from CLI args and environment
    let path_config = config::PathConfig::from_env_and_cli(args.config_dir.clone());

    // Ensure directories exist
    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {:#}", e);
    }

    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .as_ref()
            .cloned()
            .unwrap_or_else(|| config::data_file(config::LOG_FILE, &path_config));

        let file = std::fs::File::create(&log_path)?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
            .filter_module("eframe", log::LevelFilter::Info)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .filter_module("egui", log::LevelFilter::Info)
            .filter_module("eframe", log::LevelFilter::Info)
            .format_timestamp_millis()
            .init();
    }

    info!("stripview v{} starting...", env!("CARGO_PKG_VERSION"));
    debug!("Command-line args: {:?}", args);

    let settings_path = config::config_file(config::SETTINGS_FILE, &path_config);
    let mut settings = StripSettings::load_or_default(&settings_path);
    args.apply_to(&mut settings);

    let files = expand_inputs(&args.files);
    if files.is_empty() {
        info!("No input files, starting empty (drag-and-drop supported)");
    }
    if let Some(start) = args.start
        && start >= files.len()
        && !files.is_empty()
    {
        warn!("--start {} past the end of {} files, clamping", start, files.len());
    }

    let backend: Arc<dyn MediaBackend> = Arc::new(FsBackend);
    let threads = settings.decode_threads();
    let decoder = DecodePipeline::new(Arc::clone(&backend), threads);
    info!("Decode pool: {} threads", threads);

    let launch = Launch {
        files,
        start: args.start,
        panorama: settings.panorama,
        autoplay: args.autoplay_requested(),
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("stripview v{}", env!("CARGO_PKG_VERSION")))
            .with_inner_size([1280.0, 800.0])
            .with_resizable(true)
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "stripview",
        native_options,
        Box::new(move |_cc| {
            Ok(Box::new(StripApp::new(
                backend,
                Box::new(decoder),
                settings,
                Some(settings_path),
                launch,
            )))
        }),
    )?;

    info!("stripview exited");
    Ok(())
}
