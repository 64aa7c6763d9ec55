//! Errors raised while loading portal settings and preparing its directories.

use thiserror::Error;

/// Why the portal could not read, validate or persist its settings.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A setting parsed but holds an unusable value (zero interval, zero gas).
    #[error("Invalid setting: {0}")]
    Config(String),

    /// Reading or writing `config.json`, or creating the state directory.
    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),

    /// A wallet or read-only endpoint that is not a URL.
    #[error("Invalid RPC endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// `config.json` is not valid JSON for [`Config`](crate::Config).
    #[error("Malformed config file: {0}")]
    Json(#[from] serde_json::Error),

    /// No home directory to place `~/.registry-portal` under.
    #[error("Cannot resolve portal directory: {0}")]
    Path(String),

    /// The registry address is not 20 hex-encoded bytes.
    #[error("Invalid registry address {0:?}")]
    InvalidAddress(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
