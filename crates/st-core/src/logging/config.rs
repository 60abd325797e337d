//! Logging configuration.
//!
//! Level and format come from `--log-level`/`--log-format`, then `ST_LOG`/
//! `ST_LOG_FORMAT`. With no explicit level, `RUST_LOG` is handed to the
//! filter verbatim.

use clap::ValueEnum;

/// Log output format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per event.
    #[value(alias = "json")]
    Jsonl,
}

/// Verbosity of the workspace crates' events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    #[value(alias = "warning")]
    Warn,
    Error,
    #[value(alias = "quiet")]
    Off,
}

impl LogLevel {
    /// `EnvFilter` directive level.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Explicit level; `None` defers to `RUST_LOG`, then `info`.
    pub level: Option<LogLevel>,
}

impl LogConfig {
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), cli_level, cli_format)
    }

    fn from_lookup<F>(lookup: F, cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        LogConfig {
            format: cli_format
                .or_else(|| parse_value(lookup("ST_LOG_FORMAT")))
                .unwrap_or_default(),
            level: cli_level.or_else(|| parse_value(lookup("ST_LOG"))),
        }
    }
}

/// Unknown values are ignored rather than failing startup.
fn parse_value<T: ValueEnum>(raw: Option<String>) -> Option<T> {
    raw.and_then(|v| T::from_str(v.trim(), true).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_aliases_parse_case_insensitively() {
        let config = LogConfig::from_lookup(
            lookup(&[("ST_LOG", "WARNING"), ("ST_LOG_FORMAT", "json")]),
            None,
            None,
        );
        assert_eq!(config.level, Some(LogLevel::Warn));
        assert_eq!(config.format, LogFormat::Jsonl);
        assert_eq!(
            parse_value::<LogLevel>(Some("quiet".into())),
            Some(LogLevel::Off)
        );
    }

    #[test]
    fn test_unknown_values_are_ignored() {
        let config = LogConfig::from_lookup(
            lookup(&[("ST_LOG", "loud"), ("ST_LOG_FORMAT", "xml")]),
            None,
            None,
        );
        assert_eq!(config.level, None);
        assert_eq!(config.format, LogFormat::Human);
    }

    #[test]
    fn test_rust_log_is_left_to_the_filter() {
        let config = LogConfig::from_lookup(lookup(&[("RUST_LOG", "debug")]), None, None);
        assert_eq!(config.level, None);
    }

    #[test]
    fn test_cli_overrides_env() {
        let config = LogConfig::from_lookup(
            lookup(&[("ST_LOG", "error"), ("ST_LOG_FORMAT", "jsonl")]),
            Some(LogLevel::Debug),
            Some(LogFormat::Human),
        );
        assert_eq!(config.level, Some(LogLevel::Debug));
        assert_eq!(config.format, LogFormat::Human);
    }
}
