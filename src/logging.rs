//! Logging setup.
//!
//! The console gets colored output. The log file gets the same events
//! without ANSI escapes and is appended to across restarts. `RUST_LOG`
//! replaces the configured directives when it is set.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::{MirrorError, Result};

/// Dependencies that are chatty at `debug` and below.
const QUIET_TARGETS: &[&str] = &["sqlx=warn", "hyper=warn", "reqwest=info"];

/// Map a configured level name to a filter. Unknown names mean `info`.
fn level_filter(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::OFF,
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "warn" | "warning" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    }
}

fn default_directives(level: LevelFilter) -> String {
    std::iter::once(level.to_string())
        .chain(QUIET_TARGETS.iter().map(|t| t.to_string()))
        .collect::<Vec<_>>()
        .join(",")
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level_filter(level))))
}

/// Open the log file for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install the global subscriber writing to stdout and the log file.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let file = Arc::new(open_log_file(Path::new(&config.file))?);

    tracing_subscriber::registry()
        .with(build_filter(&config.level))
        .with(fmt::layer().with_target(true))
        .with(fmt::layer().with_writer(file).with_ansi(false).with_target(true))
        .try_init()
        .map_err(|e| MirrorError::Config(format!("logging already initialized: {e}")))
}

/// Install a stdout-only subscriber. Used when the log file cannot be opened.
pub fn init_console_only(level: &str) {
    let installed = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(fmt::layer().with_target(true))
        .try_init();
    if installed.is_err() {
        eprintln!("Logging was already initialized");
    }
}
