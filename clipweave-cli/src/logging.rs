// ============================================================================
// clipweave-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and File Logging
//
// The CLI logs through the `log` facade. Console output goes through
// `env_logger`, which honors RUST_LOG. When a log directory is given the
// records are dispatched with `fern` to both stderr and a timestamped file.
//
// USAGE:
// - RUST_LOG=info (default): job milestones and warnings
// - RUST_LOG=debug (or --verbose): rendered commands and per-boundary timing
// - RUST_LOG=trace: raw ffmpeg log lines

use crate::error::{CliErrorContext, CliResult};
use log::LevelFilter;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let log_filename = format!("clipweave_{}.log", clipweave_cli::logging::get_timestamp());
/// assert!(log_filename.starts_with("clipweave_"));
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Default level when RUST_LOG is not set.
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs the global logger.
///
/// Returns the path of the log file when `log_dir` is given.
pub fn init_logging(verbose: bool, log_dir: Option<&Path>) -> CliResult<Option<PathBuf>> {
    match log_dir {
        None => {
            init_console(verbose)?;
            Ok(None)
        }
        Some(dir) => init_console_and_file(verbose, dir).map(Some),
    }
}

fn init_console(verbose: bool) -> CliResult<()> {
    let default = default_level(verbose).to_string().to_lowercase();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}",
                buf.timestamp(),
                record.level(),
                record.args()
            )
        })
        .try_init()
        .map_err(|e| clipweave_core::CoreError::OperationFailed(e.to_string()))
        .cli_context("Failed to initialize logging")
}

fn init_console_and_file(verbose: bool, dir: &Path) -> CliResult<PathBuf> {
    std::fs::create_dir_all(dir)
        .cli_with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let log_path = dir.join(format!("clipweave_{}.log", get_timestamp()));

    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|value| value.parse::<LevelFilter>().ok())
        .unwrap_or_else(|| default_level(verbose));

    let log_file = fern::log_file(&log_path)
        .cli_with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {:<5} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .chain(log_file)
        .apply()
        .map_err(|e| clipweave_core::CoreError::OperationFailed(e.to_string()))
        .cli_context("Failed to initialize logging")?;

    Ok(log_path)
}
