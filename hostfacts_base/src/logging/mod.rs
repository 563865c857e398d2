//! Structured logging for the fact engine
//!
//! Key-value context macros (`log_info!("msg", "fact" => name)`) rendered
//! into a single line and forwarded to the `log` facade. The binary decides
//! where records go; the library only emits them.

pub mod macros;

#[doc(hidden)]
pub use log as __log;

use serde::{Deserialize, Serialize};

/// Log severity levels understood by the option store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Convert to the `log` crate's filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Warn
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse log level from string (used for options and environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.trim().to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warn),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        "trace" | "4" => Some(LogLevel::Trace),
        _ => None,
    }
}

/// Render message and context pairs as `message key=value key=value`
pub fn format_with_context(message: &str, context: &[(&str, &str)]) -> String {
    let mut line = String::with_capacity(message.len() + context.len() * 16);
    line.push_str(message);

    for (key, value) in context {
        line.push(' ');
        line.push_str(key);
        line.push('=');
        if value.is_empty() || value.contains(char::is_whitespace) {
            line.push('"');
            line.push_str(value);
            line.push('"');
        } else {
            line.push_str(value);
        }
    }

    line
}

/// Emit a record with context (used by the logging macros)
pub fn log_with_context(
    level: log::Level,
    target: &str,
    message: &str,
    context: Vec<(&str, &str)>,
) {
    if log::log_enabled!(target: target, level) {
        let line = format_with_context(message, &context);
        log::log!(target: target, level, "{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warn));
        assert_eq!(parse_log_level("warning"), Some(LogLevel::Warn));
        assert_eq!(parse_log_level(" info "), Some(LogLevel::Info));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("trace"), Some(LogLevel::Trace));
        assert_eq!(parse_log_level("loud"), None);
    }

    #[test]
    fn test_level_filter_mapping() {
        assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
        assert_eq!(LogLevel::default(), LogLevel::Warn);
    }

    #[test]
    fn test_format_with_context() {
        let line = format_with_context(
            "Probe failed",
            &[("resolver", "linux.memory"), ("reason", "no such file")],
        );
        assert_eq!(line, "Probe failed resolver=linux.memory reason=\"no such file\"");

        assert_eq!(format_with_context("plain", &[]), "plain");
        assert_eq!(format_with_context("empty", &[("v", "")]), "empty v=\"\"");
    }

    #[test]
    fn test_macros_do_not_panic_without_logger() {
        crate::log_debug!("debug message", "fact" => "kernel");
        crate::log_info!("info message");
        crate::log_warning!("warning message", "count" => 3);
        crate::log_error!("error message", "cycle" => "a -> b -> a");
    }
}
