//! # sessionlens-logging
//!
//! Tracing setup shared by the sessionlens binary.
//!
//! ## Log Formats
//!
//! - `Pretty` - Human-readable output
//! - `JSON` - Structured JSON lines
//! - `Compact` - Minimal single-line output
//!
//! Console output goes to stderr so report output on stdout stays clean.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize tracing for the application
pub fn init_tracing(level: &str, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(env_filter(level));
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);

    match format {
        LogFormat::Json => registry.with(console.json()).init(),
        LogFormat::Compact => registry.with(console.compact()).init(),
        LogFormat::Pretty => registry.with(console).init(),
    }
}

/// Initialize tracing with an additional daily-rotated JSON log file in
/// `log_dir`. Keep the returned guard alive until exit or buffered lines are
/// lost.
pub fn init_tracing_with_file(level: &str, format: LogFormat, log_dir: &Path) -> WorkerGuard {
    let appender = tracing_appender::rolling::daily(log_dir, "sessionlens.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file = fmt::layer()
        .json()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false);

    let registry = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(file);
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);

    match format {
        LogFormat::Json => registry.with(console.json()).init(),
        LogFormat::Compact => registry.with(console.compact()).init(),
        LogFormat::Pretty => registry.with(console).init(),
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("Pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert_eq!("COMPACT".parse::<LogFormat>(), Ok(LogFormat::Compact));
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
