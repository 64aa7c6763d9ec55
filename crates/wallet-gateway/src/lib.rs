//! # Wallet Gateway
//!
//! Thin adapter over the (optional) wallet provider.
//!
//! | Operation | Prompts user | No provider | Provider failure |
//! |-----------|--------------|-------------|------------------|
//! | [`WalletGateway::capability`] | no | `false` | n/a |
//! | [`WalletGateway::discover_authorized_account`] | no | `None` | logged, `None` |
//! | [`WalletGateway::request_connection`] | yes | `Err(NoProvider)` | logged, `None` |
//!
//! A user declining the prompt is not an error here: it resolves to `None`.

use provider_rpc::{Address, SharedProvider};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Silent account query; never prompts.
const METHOD_ACCOUNTS: &str = "eth_accounts";
/// Explicit account request; prompts the user.
const METHOD_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";

/// Wallet gateway error type.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The environment has no wallet provider.
    #[error("no wallet provider available, install or enable a wallet")]
    NoProvider,
}

/// Result type alias using WalletError.
pub type WalletResult<T> = Result<T, WalletError>;

/// Adapter over the wallet provider, if one exists.
///
/// Stateless: holds only the provider handle. Re-create it when the provider
/// changes.
#[derive(Clone)]
pub struct WalletGateway {
    provider: Option<SharedProvider>,
}

impl WalletGateway {
    /// Creates a gateway over an optional provider.
    pub fn new(provider: Option<SharedProvider>) -> Self {
        Self { provider }
    }

    /// Creates a gateway for an environment without any wallet.
    pub fn without_provider() -> Self {
        Self { provider: None }
    }

    /// Returns true if a wallet provider is present.
    pub fn capability(&self) -> bool {
        self.provider.is_some()
    }

    /// Returns the underlying provider handle, if any.
    pub fn provider(&self) -> Option<&SharedProvider> {
        self.provider.as_ref()
    }

    /// Returns the account the wallet has already authorized, without prompting.
    pub async fn discover_authorized_account(&self) -> Option<Address> {
        let Some(provider) = &self.provider else {
            info!("No wallet provider found, skipping account discovery");
            return None;
        };

        match provider.request(METHOD_ACCOUNTS, json!([])).await {
            Ok(value) => {
                let account = first_account(&value);
                match &account {
                    Some(account) => info!(account = %account, "Found an authorized account"),
                    None => info!("No authorized account found"),
                }
                account
            }
            Err(e) => {
                warn!(error = %e, "Account discovery failed");
                None
            }
        }
    }

    /// Prompts the user to authorize an account.
    ///
    /// Returns `Err(NoProvider)` when there is no wallet at all; that case must
    /// be shown to the user. A declined prompt or any other provider failure is
    /// logged and resolves to `Ok(None)`.
    pub async fn request_connection(&self) -> WalletResult<Option<Address>> {
        let Some(provider) = &self.provider else {
            warn!("Connect requested but no wallet provider is available");
            return Err(WalletError::NoProvider);
        };

        match provider.request(METHOD_REQUEST_ACCOUNTS, json!([])).await {
            Ok(value) => {
                let account = first_account(&value);
                match &account {
                    Some(account) => info!(account = %account, "Connected"),
                    None => warn!("Wallet authorized no accounts"),
                }
                Ok(account)
            }
            Err(e) if e.is_user_rejected() => {
                info!("User rejected the connection request");
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "Connection request failed");
                Ok(None)
            }
        }
    }
}

/// Picks the first account out of an `eth_accounts`-shaped result.
fn first_account(value: &Value) -> Option<Address> {
    let raw = value.as_array()?.first()?.as_str()?;
    match raw.parse() {
        Ok(address) => Some(address),
        Err(e) => {
            debug!(raw, error = %e, "Ignoring malformed account from wallet");
            None
        }
    }
}
