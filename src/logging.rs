//! Console and file logging setup.
//!
//! Logging is configured from resolved [`Settings`]:
//! - stderr at `verbosity` (`RUST_LOG` may override it)
//! - an optional log file at `log_file_verbosity`, appended to or truncated
//!   according to `log_file_mode`

use crate::config::{LogFileMode, Settings, Verbosity};
use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Convert a configured verbosity to a tracing level.
///
/// tracing has no level above ERROR, so critical maps to ERROR as well.
pub fn verbosity_to_tracing(verbosity: Verbosity) -> Level {
    match verbosity {
        Verbosity::Debug => Level::DEBUG,
        Verbosity::Info => Level::INFO,
        Verbosity::Warning => Level::WARN,
        Verbosity::Error | Verbosity::Critical => Level::ERROR,
    }
}

pub fn level_filter(verbosity: Verbosity) -> LevelFilter {
    LevelFilter::from_level(verbosity_to_tracing(verbosity))
}

/// Console filter: `RUST_LOG` when set, else `verbosity`.
fn console_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level_filter(verbosity).into())
        .from_env_lossy()
}

/// Open the log file in the configured mode, creating it if needed.
pub fn open_log_file(path: &Path, mode: LogFileMode) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        LogFileMode::Append => options.append(true),
        LogFileMode::Overwrite => options.write(true).truncate(true),
    };
    options.open(path)
}

/// Install the global subscriber.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(console_filter(settings.verbosity));

    let file_layer = match &settings.log_file {
        Some(path) => {
            let file = open_log_file(path, settings.log_file_mode)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_filter(level_filter(settings.log_file_verbosity)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install logging subscriber")?;

    Ok(())
}
