//! Logging utilities

use std::fs;
use std::path::Path;

use chrono::Local;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging with file and console output
///
/// # Arguments
/// * `log_dir` - Directory to store log files
/// * `prefix` - Prefix for log file names (e.g., "droiddeck")
/// * `level` - Log level (debug, info, warn, error)
pub fn init_logging(log_dir: &str, prefix: &str, level: &str) -> crate::Result<()> {
    let log_path = Path::new(log_dir);
    if !log_path.exists() {
        fs::create_dir_all(log_path)?;
    }

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let log_file = log_path.join(format!("{}_{}.log", prefix, timestamp));
    let file = fs::File::create(&log_file)?;

    // Console goes to stderr so command output on stdout stays parseable
    let subscriber = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(false),
        )
        .with(
            fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        );

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| crate::Error::Other(format!("Failed to set subscriber: {}", e)))?;

    tracing::info!("Logging initialized - file: {:?}", log_file);

    Ok(())
}

/// Initialize console-only logging on stderr
pub fn init_console_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
