//! # Observability
//!
//! Logging setup for the registry portal.
//!
//! Crates only use `tracing` macros. The binary calls
//! [`init_with_config`] once at startup and decides where events go.
//!
//! ## Dev Mode
//!
//! With the `dev` feature (default) every event is written as one JSON object
//! per line to `~/.registry-portal/logs/dev.jsonl`:
//!
//! - `tail -f ~/.registry-portal/logs/dev.jsonl | jq` for pretty JSON
//! - `jq 'select(.fields.tx_hash)'` to follow submissions
//!
//! A compact stderr layer can be added for interactive runs.
//!
//! ## Usage
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "registry-portal".into(),
//!     default_level: "debug".into(),
//!     also_stderr: true,
//!     ..Default::default()
//! })?;
//! tracing::info!("ready");
//! ```

#[cfg(feature = "dev")]
mod dev;

mod json_layer;

use std::io;
use std::path::PathBuf;

pub use json_layer::{JsonLayer, LogEntry};

/// Directory under the home directory that holds portal state.
pub const BASE_DIR_NAME: &str = ".registry-portal";

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the emitting program, included in every log line.
    pub service_name: String,

    /// Default filter for the JSONL file (e.g. "debug", "info").
    /// `RUST_LOG` takes precedence when set.
    pub default_level: String,

    /// Custom log file path. Defaults to `~/.registry-portal/logs/dev.jsonl`.
    pub log_path: Option<PathBuf>,

    /// Also emit compact logs to stderr.
    pub also_stderr: bool,

    /// Filter for the stderr layer.
    pub stderr_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
            stderr_level: "warn".into(),
        }
    }
}

/// Default central log file, `~/.registry-portal/logs/dev.jsonl`.
///
/// Falls back to the temp directory when no home directory is known.
pub fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(BASE_DIR_NAME)
        .join("logs")
        .join("dev.jsonl")
}

/// Initialize logging with default settings for `service_name`.
pub fn init(service_name: &str) -> io::Result<()> {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    })
}

/// Initialize logging with custom configuration.
///
/// Fails if the log file cannot be opened or a global subscriber is
/// already installed.
#[cfg(feature = "dev")]
pub fn init_with_config(config: LogConfig) -> io::Result<()> {
    dev::init_dev_subscriber(&config)
}

/// Initialize logging with custom configuration (stderr only).
#[cfg(not(feature = "dev"))]
pub fn init_with_config(config: LogConfig) -> io::Result<()> {
    use tracing_subscriber::util::SubscriberInitExt;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.default_level)),
        )
        .with_writer(io::stderr)
        .with_target(true)
        .compact()
        .finish()
        .try_init()
        .map_err(io::Error::other)
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export Level for advanced filtering.
pub use tracing::Level;
