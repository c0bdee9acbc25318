//! Human-readable dump of a loaded config, for operators only.

use std::fmt;

use crate::config::schema::SyncConfig;

const LABEL_WIDTH: usize = 30;
const INDENT: &str = "          ";
const NESTED_INDENT: &str = "                    ";

impl fmt::Display for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "========================= SYNC CONFIG ===================")?;
        field(f, "daemon:", if self.daemon { "yes" } else { "no" })?;
        field(f, "log_level:", self.log_level.as_str())?;
        field(f, "log_dst:", self.log_dst.as_str())?;
        field(f, "log_file:", opt(&self.log_file))?;
        field(f, "mode:", opt(&self.mode))?;
        field(f, "port:", self.port)?;
        field(f, "watch_path:", opt(&self.watch_path))?;
        field(f, "subscribe_path:", opt(&self.subscribe_path))?;

        writeln!(f, "watch_set:")?;
        for path in self.watch_set.iter() {
            writeln!(f, "{INDENT}{path}")?;
        }

        writeln!(f, "subscribe_map:")?;
        for (host, paths) in self.subscribe_map.iter() {
            writeln!(f, "{INDENT}{host}")?;
            for path in paths.iter() {
                writeln!(f, "{NESTED_INDENT}{path}")?;
            }
        }

        writeln!(f, "server_list:")?;
        for server in self.server_list.iter() {
            writeln!(f, "{INDENT}{server}")?;
        }
        write!(f, "===========================================================")
    }
}

fn field(f: &mut fmt::Formatter<'_>, label: &str, value: impl fmt::Display) -> fmt::Result {
    writeln!(f, "{label:<width$}{value}", width = LABEL_WIDTH)
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("(none)")
}

/// Output format for `--dump`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DumpFormat {
    Text,
    Json,
}

/// JSON rendering of the same dump.
pub fn to_json(config: &SyncConfig) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(config)
}

/// Render `config` in the requested format.
pub fn render(config: &SyncConfig, format: DumpFormat) -> Result<String, serde_json::Error> {
    match format {
        DumpFormat::Text => Ok(config.to_string()),
        DumpFormat::Json => to_json(config),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::loader::parse_config;

    use super::*;

    #[test]
    fn text_dump_lists_every_container() {
        let config = parse_config(
            "port = 9000\nwatch_path = /a,/b\nsubscribe_path = h1:/a|/b\nserver_list = s1",
        )
        .unwrap();
        let dump = config.to_string();

        assert!(dump.contains("port:"));
        assert!(dump.contains("9000"));
        assert!(dump.contains("log_file:                     (none)"));
        assert!(dump.contains(&format!("{INDENT}h1\n")));
        assert!(dump.contains(&format!("{NESTED_INDENT}/b\n")));
        assert!(dump.contains(&format!("server_list:\n{INDENT}s1\n")));
    }

    #[test]
    fn json_dump_nests_subscriptions() {
        let config = parse_config("subscribe_path = h1:/a|/b,h2:/c").unwrap();
        let value: serde_json::Value = serde_json::from_str(&to_json(&config).unwrap()).unwrap();

        assert_eq!(value["subscribe_map"]["h1"], serde_json::json!(["/a", "/b"]));
        assert_eq!(value["log_dst"], "console");
    }
}
