//! Configuration management for the portal.

use crate::{CoreError, CoreResult, Paths};
use provider_rpc::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Address of the deployed registry contract.
pub const DEFAULT_REGISTRY_ADDRESS: &str = "0x7Ee8a1cDe62d295E5222B3303c065B1d5E262b14";

/// Gas ceiling attached to every submission.
pub const DEFAULT_GAS_CEILING: u64 = 300_000;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 4_000;
pub const DEFAULT_CONFIRMATION_POLL_INTERVAL_MS: u64 = 1_000;

/// Overrides `log_level`.
pub const LOG_LEVEL_ENV: &str = "REGISTRY_PORTAL_LOG_LEVEL";

/// Overrides `wallet_rpc_url`. An empty value clears it.
pub const WALLET_URL_ENV: &str = "REGISTRY_PORTAL_WALLET_URL";

/// Main portal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// JSON-RPC endpoint of the wallet. Absent means no wallet is installed.
    #[serde(default)]
    pub wallet_rpc_url: Option<String>,
    /// Read-only endpoint used when no wallet is involved.
    #[serde(default)]
    pub read_rpc_url: Option<String>,
    #[serde(default = "default_registry_address")]
    pub registry_address: String,
    #[serde(default = "default_gas_ceiling")]
    pub gas_ceiling: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_confirmation_poll_interval_ms")]
    pub confirmation_poll_interval_ms: u64,
    /// Longest accepted message in characters. Unlimited when absent.
    #[serde(default)]
    pub max_message_len: Option<usize>,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_registry_address() -> String {
    DEFAULT_REGISTRY_ADDRESS.to_string()
}

fn default_gas_ceiling() -> u64 {
    DEFAULT_GAS_CEILING
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_confirmation_poll_interval_ms() -> u64 {
    DEFAULT_CONFIRMATION_POLL_INTERVAL_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            wallet_rpc_url: None,
            read_rpc_url: None,
            registry_address: default_registry_address(),
            gas_ceiling: DEFAULT_GAS_CEILING,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            confirmation_poll_interval_ms: DEFAULT_CONFIRMATION_POLL_INTERVAL_MS,
            max_message_len: None,
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from the config file, falling back to defaults,
    /// then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    fn load_from_env(&mut self) {
        self.apply_overrides(
            std::env::var(LOG_LEVEL_ENV).ok(),
            std::env::var(WALLET_URL_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, log_level: Option<String>, wallet_url: Option<String>) {
        if let Some(level) = log_level.filter(|l| !l.trim().is_empty()) {
            self.log_level = level.trim().to_string();
        }
        if let Some(url) = wallet_url {
            let url = url.trim();
            self.wallet_rpc_url = (!url.is_empty()).then(|| url.to_string());
        }
    }

    /// The registry contract address, parsed.
    pub fn registry_address(&self) -> CoreResult<Address> {
        self.registry_address
            .parse()
            .map_err(|_| CoreError::InvalidAddress(self.registry_address.clone()))
    }

    /// The wallet endpoint, if one is configured.
    pub fn wallet_rpc_url(&self) -> CoreResult<Option<Url>> {
        parse_optional_url(self.wallet_rpc_url.as_deref())
    }

    /// The read-only endpoint, if one is configured.
    pub fn read_rpc_url(&self) -> CoreResult<Option<Url>> {
        parse_optional_url(self.read_rpc_url.as_deref())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_interval_ms)
    }

    /// Check every field that has to parse or be non-zero.
    pub fn validate(&self) -> CoreResult<()> {
        self.registry_address()?;
        self.wallet_rpc_url()?;
        self.read_rpc_url()?;

        if self.gas_ceiling == 0 {
            return Err(CoreError::Config("gas_ceiling must be positive".into()));
        }
        if self.poll_interval_ms == 0 || self.confirmation_poll_interval_ms == 0 {
            return Err(CoreError::Config("poll intervals must be positive".into()));
        }
        if self.max_message_len == Some(0) {
            return Err(CoreError::Config("max_message_len must be positive".into()));
        }
        Ok(())
    }
}

fn parse_optional_url(raw: Option<&str>) -> CoreResult<Option<Url>> {
    raw.map(|s| Url::parse(s).map_err(CoreError::from))
        .transpose()
}
