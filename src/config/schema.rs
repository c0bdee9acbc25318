//! Configuration schema definitions.
//!
//! [`SyncConfig`] is built once by the loader and shared read-only (via
//! `Arc`) with every worker thread.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::config::topology::{SubscribeMap, WatchSet};

/// Root configuration for the sync agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncConfig {
    /// Whether the agent was asked to run as a daemon.
    pub daemon: bool,

    /// Minimum level emitted by the logger.
    pub log_level: LogLevel,

    /// Where log output goes.
    pub log_dst: LogDestination,

    /// Log file path, required when `log_dst` is `file`.
    pub log_file: Option<String>,

    /// Free-form operating mode, carried for diagnostics.
    pub mode: Option<String>,

    /// TCP port the peer listener binds on all interfaces.
    pub port: u16,

    /// Raw `watch_path` value as written in the file.
    pub watch_path: Option<String>,

    /// Raw `subscribe_path` value as written in the file.
    pub subscribe_path: Option<String>,

    /// Local directories to watch.
    pub watch_set: WatchSet,

    /// Remote host → subscribed paths.
    pub subscribe_map: SubscribeMap,

    /// Peer servers.
    pub server_list: WatchSet,
}

impl SyncConfig {
    /// True if `host` is a configured server or has a subscription.
    pub fn knows_host(&self, host: &str) -> bool {
        self.server_list.contains(host) || self.subscribe_map.contains_host(host)
    }
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Lowercase name, as accepted in the config file.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(()),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where log output goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogDestination {
    #[default]
    Console,
    File,
    Syslog,
}

impl LogDestination {
    /// Lowercase name, as accepted in the config file.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogDestination::Console => "console",
            LogDestination::File => "file",
            LogDestination::Syslog => "syslog",
        }
    }
}

impl FromStr for LogDestination {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" => Ok(LogDestination::Console),
            "file" => Ok(LogDestination::File),
            "syslog" => Ok(LogDestination::Syslog),
            _ => Err(()),
        }
    }
}

impl fmt::Display for LogDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
