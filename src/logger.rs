use std::fs;
use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{Result, StealerError};

/// Initialize structured logging.
///
/// - Console output (stderr): stdout carries the event stream, so logs
///   never go there.
/// - File output, when `log_dir` is given: `input-stealer.*.log`, daily
///   rotation, keeping the latest 5 files.
/// - Environment filter: defaults to `info`, configurable via `RUST_LOG`.
pub fn init(log_dir: Option<&Path>) -> Result<()> {
    let file_layer = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("input-stealer")
                .filename_suffix("log")
                .max_log_files(5)
                .build(dir)
                .map_err(|e| StealerError::Config(format!("log file appender: {}", e)))?;
            Some(
                fmt::layer()
                    .with_writer(appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
        }
        None => None,
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| StealerError::Config(format!("logger already initialized: {}", e)))?;

    if let Some(dir) = log_dir {
        tracing::info!(log_dir = %dir.display(), "Logger initialized");
    }
    Ok(())
}
