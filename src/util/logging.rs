//! Structured logging setup
//!
//! Logs always go to stderr. Stdout carries command output only, and the
//! build harness parses it (the release document in particular).
//!
//! ```no_run
//! use rackpack::util::logging::{init_logging, LoggingConfig};
//!
//! init_logging(LoggingConfig::from_env());
//! tracing::info!(adapter = "rails3", "Adapter selected");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

const LEVEL_VAR: &str = "RACKPACK_LOG_LEVEL";
const JSON_VAR: &str = "RACKPACK_LOG_JSON";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Plain,
    /// One JSON object per event, for build log collectors
    Json,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Plain,
        }
    }
}

impl LoggingConfig {
    /// Reads `RACKPACK_LOG_LEVEL` and `RACKPACK_LOG_JSON`
    pub fn from_env() -> Self {
        let level = env::var(LEVEL_VAR)
            .map(|v| parse_level(&v))
            .unwrap_or(Level::INFO);
        let format = if env_flag(JSON_VAR) {
            LogFormat::Json
        } else {
            LogFormat::Plain
        };

        Self { level, format }
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn json(mut self, enabled: bool) -> Self {
        if enabled {
            self.format = LogFormat::Json;
        }
        self
    }
}

fn env_flag(name: &str) -> bool {
    matches!(
        env::var(name).map(|v| v.to_ascii_lowercase()).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Parses a level name case-insensitively, falling back to INFO
///
/// ```
/// use rackpack::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("Debug"), Level::DEBUG);
/// assert_eq!(parse_level("chatty"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    level_from_name(level_str).unwrap_or_else(|| {
        eprintln!(
            "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
            level_str
        );
        Level::INFO
    })
}

/// Strict counterpart of [`parse_level`]: `None` for unknown names
pub fn level_from_name(level_str: &str) -> Option<Level> {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// `RUST_LOG` replaces the computed filter entirely
fn build_filter(level: Level) -> EnvFilter {
    if env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }

    let filter = EnvFilter::new("warn");
    match format!("rackpack={}", level).parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// Installs the global subscriber; later calls are no-ops
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);
        let registry = tracing_subscriber::registry().with(filter);

        match config.format {
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .init(),
            LogFormat::Plain => registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false),
                )
                .init(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level(" WARN "), Level::WARN);
        assert_eq!(parse_level("warning"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn test_level_from_name_is_strict() {
        assert_eq!(level_from_name("Warning"), Some(Level::WARN));
        assert_eq!(level_from_name("chatty"), None);
        assert_eq!(level_from_name(""), None);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var(LEVEL_VAR, "debug");
        env::set_var(JSON_VAR, "true");

        let config = LoggingConfig::from_env();
        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.format, LogFormat::Json);

        env::remove_var(LEVEL_VAR);
        env::remove_var(JSON_VAR);
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        env::remove_var(LEVEL_VAR);
        env::remove_var(JSON_VAR);

        let config = LoggingConfig::from_env();
        assert_eq!(config.level, Level::INFO);
        assert_eq!(config.format, LogFormat::Plain);
    }

    #[test]
    fn test_json_flag_never_downgrades() {
        let config = LoggingConfig::default().json(true).json(false);
        assert_eq!(config.format, LogFormat::Json);
    }
}
