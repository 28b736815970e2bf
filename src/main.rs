//! Tula - Sensor calibration daemon
//!
//! Loads the stored calibration, then ticks the calibration sequencer and the
//! drift monitor until interrupted.
//!
//! ```text
//! tula [--config <path>] [--calibrate] [--reset]
//! ```
//!
//! - `--calibrate`: run one calibration, report the result and exit
//! - `--reset`: overwrite the stored calibration with defaults and exit

use std::env;
use std::sync::atomic::Ordering;
use tula::app::CalibrationApp;
use tula::config::AppConfig;
use tula::error::{Error, Result};

/// Command line options
struct Args {
    config_path: String,
    calibrate: bool,
    reset: bool,
}

/// Parse command line arguments.
///
/// Supports:
/// - `tula <path>` (positional)
/// - `tula --config <path>` (flag-based)
/// - `tula -c <path>` (short flag)
///
/// Defaults to `/etc/tula.toml` if no path is given.
fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();

    let mut config_path = None;
    let mut calibrate = false;
    let mut reset = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" if i + 1 < args.len() => {
                config_path = Some(args[i + 1].clone());
                i += 1;
            }
            "--calibrate" => calibrate = true,
            "--reset" => reset = true,
            arg if !arg.starts_with('-') && config_path.is_none() => {
                config_path = Some(arg.to_string());
            }
            arg => eprintln!("Ignoring unknown argument: {}", arg),
        }
        i += 1;
    }

    Args {
        config_path: config_path.unwrap_or_else(|| "/etc/tula.toml".to_string()),
        calibrate,
        reset,
    }
}

fn main() -> Result<()> {
    let args = parse_args();

    // A missing config file falls back to defaults; a malformed one is fatal
    let config = if std::path::Path::new(&args.config_path).exists() {
        Some(AppConfig::from_file(&args.config_path)?)
    } else {
        None
    };
    let config_found = config.is_some();
    let config = config.unwrap_or_default();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("Tula v{} starting...", env!("CARGO_PKG_VERSION"));
    if config_found {
        log::info!("Using config: {}", args.config_path);
    } else {
        log::warn!("Config {} not found, using defaults", args.config_path);
    }
    log::info!("Device: {}", config.device.device_type);

    let mut app = CalibrationApp::new(config)?;

    let running = app.running_flag();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        running.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    if args.reset {
        app.reset_to_default()?;
        app.log_status();
        return Ok(());
    }

    if args.calibrate {
        let result = app.calibrate_blocking();
        app.log_status();
        return result;
    }

    app.log_status();
    app.run()?;

    log::info!("Tula stopped");
    Ok(())
}
