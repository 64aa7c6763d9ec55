//! Logging initialization for the portal.
//!
//! Thin wrapper over `observability`: every event goes to the central JSONL
//! file, and warnings also go to stderr.

use std::path::PathBuf;

use crate::CoreResult;

/// Service name written into every log line.
pub const SERVICE_NAME: &str = "registry-portal";

/// Initialize the logging system.
///
/// `level` is the default filter for the log file; `RUST_LOG` takes
/// precedence. Pass `log_path` to write somewhere other than
/// `~/.registry-portal/logs/dev.jsonl`.
///
/// ```ignore
/// init_logging("info", None, true)?;
/// tracing::info!("Portal started");
/// ```
pub fn init_logging(level: &str, log_path: Option<PathBuf>, also_stderr: bool) -> CoreResult<()> {
    observability::init_with_config(observability::LogConfig {
        service_name: SERVICE_NAME.into(),
        default_level: level.into(),
        log_path,
        also_stderr,
        ..Default::default()
    })?;
    Ok(())
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_all_variants() {
        assert_eq!(parse_level("trace"), tracing::Level::TRACE);
        assert_eq!(parse_level("debug"), tracing::Level::DEBUG);
        assert_eq!(parse_level("info"), tracing::Level::INFO);
        assert_eq!(parse_level("warning"), tracing::Level::WARN);
        assert_eq!(parse_level("ERROR"), tracing::Level::ERROR);
    }

    #[test]
    fn parse_level_unknown_defaults_to_info() {
        assert_eq!(parse_level(""), tracing::Level::INFO);
        assert_eq!(parse_level("verbose"), tracing::Level::INFO);
    }
}
