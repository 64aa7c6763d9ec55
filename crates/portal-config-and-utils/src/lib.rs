//! Core configuration and utilities for the registry portal.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DEFAULT_CONFIRMATION_POLL_INTERVAL_MS, DEFAULT_GAS_CEILING, DEFAULT_LOG_LEVEL,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_REGISTRY_ADDRESS, LOG_LEVEL_ENV, WALLET_URL_ENV,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level, SERVICE_NAME};
pub use paths::Paths;
