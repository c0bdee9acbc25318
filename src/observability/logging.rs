//! Structured logging.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber from the loaded config
//! - Route output to the console, a log file, or a syslog-friendly stream
//!
//! `RUST_LOG` overrides the configured `log_level` when set.

use std::fs::{File, OpenOptions};
use std::io;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::{LogDestination, LogLevel, SyncConfig};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("log_dst is `file` but no log_file is configured")]
    MissingLogFile,

    #[error("failed to open log file {path}: {source}")]
    OpenLogFile {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

/// Install the global subscriber. Call once, after the config is loaded.
pub fn init_logging(config: &SyncConfig) -> Result<(), LoggingError> {
    let filter = env_filter(config.log_level);
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = match config.log_dst {
        LogDestination::Console => builder.with_writer(io::stderr).try_init(),
        LogDestination::File => {
            let file = open_log_file(config.log_file.as_deref())?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        // The service manager stamps each line itself.
        LogDestination::Syslog => builder
            .with_ansi(false)
            .without_time()
            .with_writer(io::stderr)
            .try_init(),
    };

    installed.map_err(|e| LoggingError::Install(e.to_string()))
}

/// Console subscriber used when the config itself could not be loaded.
pub fn init_console_fallback() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(LogLevel::default()))
        .with_writer(io::stderr)
        .try_init();
}

fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Open `path` for appending, creating it if needed.
pub fn open_log_file(path: Option<&str>) -> Result<File, LoggingError> {
    let path = path
        .filter(|p| !p.is_empty())
        .ok_or(LoggingError::MissingLogFile)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::OpenLogFile {
            path: path.to_owned(),
            source,
        })
}
