//! Configuration loading from disk.
//!
//! Every property is dispatched to a field handler. The first failing
//! handler aborts the whole load; the partially built config is dropped and
//! only the error reaches the caller.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::property::{properties, PropertyError};
use crate::config::schema::SyncConfig;
use crate::config::topology::{build_subscribe_map, build_watch_set, TopologyError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {} does not exist", .0.display())]
    Missing(PathBuf),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error("unknown config key `{key}` (value `{value}`)")]
    UnknownKey { key: String, value: String },

    #[error("invalid value `{value}` for `{key}`")]
    InvalidValue { key: &'static str, value: String },

    #[error("invalid subscribe_path: {0}")]
    Topology(#[from] TopologyError),
}

/// Load a property file into a [`SyncConfig`].
pub fn load_config(path: &Path) -> Result<SyncConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Missing(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Build a [`SyncConfig`] from property-file text.
pub fn parse_config(content: &str) -> Result<SyncConfig, ConfigError> {
    let mut config = SyncConfig::default();
    for property in properties(content) {
        let property = property?;
        apply_item(&mut config, property.key, property.value)?;
    }
    Ok(config)
}

/// Apply one `key = value` pair. Keys are matched case-insensitively.
pub fn apply_item(config: &mut SyncConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    tracing::debug!(key, value, "Config item");

    match key.to_ascii_lowercase().as_str() {
        "daemon" => {
            config.daemon = match value.to_ascii_lowercase().as_str() {
                "yes" => true,
                "no" => false,
                _ => return Err(invalid("daemon", value)),
            };
        }
        "log_level" => {
            config.log_level = value.parse().map_err(|_| invalid("log_level", value))?;
        }
        "log_dst" => {
            config.log_dst = value.parse().map_err(|_| invalid("log_dst", value))?;
        }
        "log_file" => config.log_file = Some(value.to_owned()),
        "mode" => config.mode = Some(value.to_owned()),
        "port" => {
            config.port = u16::try_from(atoi(value)).map_err(|_| invalid("port", value))?;
        }
        "watch_path" => {
            config.watch_set = build_watch_set(value);
            config.watch_path = Some(value.to_owned());
        }
        "subscribe_path" => {
            config.subscribe_map = build_subscribe_map(value)?;
            config.subscribe_path = Some(value.to_owned());
        }
        "server_list" => config.server_list = build_watch_set(value),
        _ => {
            return Err(ConfigError::UnknownKey {
                key: key.to_owned(),
                value: value.to_owned(),
            })
        }
    }

    Ok(())
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_owned(),
    }
}

/// C `atoi`: optional leading whitespace and sign, then leading digits.
/// Anything without digits is 0.
fn atoi(value: &str) -> i64 {
    let s = value.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{LogDestination, LogLevel};

    #[test]
    fn parses_every_known_key() {
        let content = "\
DAEMON = yes
log_level = debug
log_dst = file
log_file = /var/log/sync_agent.log
mode = master
port = 8000
watch_path = /data/a,/data/b,/data/a
subscribe_path = 10.0.0.2:/data/a|/data/b,10.0.0.3:/data/b
server_list = 10.0.0.2,10.0.0.3
";
        let config = parse_config(content).unwrap();

        assert!(config.daemon);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.log_dst, LogDestination::File);
        assert_eq!(config.log_file.as_deref(), Some("/var/log/sync_agent.log"));
        assert_eq!(config.mode.as_deref(), Some("master"));
        assert_eq!(config.port, 8000);
        assert_eq!(config.watch_path.as_deref(), Some("/data/a,/data/b,/data/a"));
        assert_eq!(config.watch_set.len(), 2);
        assert_eq!(config.subscribe_map.len(), 2);
        assert_eq!(config.subscribe_map.get("10.0.0.2").unwrap().len(), 2);
        assert_eq!(config.server_list.len(), 2);
    }

    #[test]
    fn unknown_key_fails() {
        let err = parse_config("port = 1\ncolour = blue\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey { ref key, .. } if key == "colour"));
    }

    #[test]
    fn bad_enum_values_fail() {
        assert!(matches!(
            parse_config("daemon = maybe"),
            Err(ConfigError::InvalidValue { key: "daemon", .. })
        ));
        assert!(matches!(
            parse_config("log_level = loud"),
            Err(ConfigError::InvalidValue { key: "log_level", .. })
        ));
        assert!(matches!(
            parse_config("log_dst = printer"),
            Err(ConfigError::InvalidValue { key: "log_dst", .. })
        ));
    }

    #[test]
    fn port_follows_atoi() {
        assert_eq!(parse_config("port = http").unwrap().port, 0);
        assert_eq!(parse_config("port = 8080abc").unwrap().port, 8080);
        assert!(parse_config("port = 70000").is_err());
        assert!(parse_config("port = -1").is_err());
    }

    #[test]
    fn malformed_subscribe_entry_fails_closed() {
        let err = parse_config("subscribe_path = 10.0.0.2/data").unwrap_err();
        assert!(matches!(err, ConfigError::Topology(_)));
    }

    #[test]
    fn empty_topology_values_build_empty_containers() {
        let config = parse_config("watch_path =\nsubscribe_path =\nserver_list =").unwrap();
        assert!(config.watch_set.is_empty());
        assert!(config.subscribe_map.is_empty());
        assert!(config.server_list.is_empty());
        assert_eq!(config.watch_path.as_deref(), Some(""));
    }

    #[test]
    fn defaults_when_keys_absent() {
        let config = parse_config("").unwrap();
        assert_eq!(config, SyncConfig::default());
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.log_dst, LogDestination::Console);
    }
}
