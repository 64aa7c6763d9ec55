//! CLI command implementations.

mod records;
mod wallet;

pub use records::{count, list, watch};
pub use wallet::{connect, submit};

use std::sync::Arc;

use anyhow::Result;
use ledger_client::{LedgerClient, LedgerClientConfig, RegistryBinding};
use portal_config_and_utils::{Config, CoreResult};
use provider_rpc::{HttpProvider, SharedProvider};
use sync_engine::{EngineConfig, EngineEvent, SyncEngine, SyncNotice};
use tokio::sync::broadcast;
use tracing::debug;
use url::Url;
use wallet_gateway::WalletGateway;

/// Builds the engine against the configured wallet endpoint, if any.
pub fn build_engine(config: &Config) -> Result<SyncEngine> {
    let provider = config.wallet_rpc_url()?.map(http_provider);
    if provider.is_none() {
        debug!("No wallet endpoint configured");
    }
    Ok(engine_with_provider(config, provider)?)
}

/// Builds the engine on an explicit provider.
pub fn engine_with_provider(
    config: &Config,
    provider: Option<SharedProvider>,
) -> CoreResult<SyncEngine> {
    let engine_config = EngineConfig {
        binding: RegistryBinding::v1(config.registry_address()?),
        gas_ceiling: config.gas_ceiling,
        max_message_len: config.max_message_len,
        ledger: ledger_config(config),
    };
    Ok(SyncEngine::new(WalletGateway::new(provider), engine_config))
}

/// A signer-less client for informational reads.
///
/// Prefers the read-only endpoint and falls back to the wallet endpoint.
pub fn read_only_client(config: &Config) -> Result<LedgerClient> {
    let url = match config.read_rpc_url()? {
        Some(url) => url,
        None => config.wallet_rpc_url()?.ok_or_else(|| {
            anyhow::anyhow!("No RPC endpoint configured. Set read_rpc_url or wallet_rpc_url")
        })?,
    };

    Ok(LedgerClient::new(
        RegistryBinding::v1(config.registry_address()?),
        http_provider(url),
        None,
        ledger_config(config),
    ))
}

fn ledger_config(config: &Config) -> LedgerClientConfig {
    LedgerClientConfig {
        poll_interval: config.poll_interval(),
        confirmation_poll_interval: config.confirmation_poll_interval(),
    }
}

fn http_provider(url: Url) -> SharedProvider {
    Arc::new(HttpProvider::new(url.as_str()))
}

/// Notices already queued on `events`, without waiting.
fn pending_notices(events: &mut broadcast::Receiver<EngineEvent>) -> Vec<SyncNotice> {
    let mut notices = Vec::new();
    loop {
        match events.try_recv() {
            Ok(EngineEvent::Notice(notice)) => notices.push(notice),
            Ok(_) => {}
            Err(broadcast::error::TryRecvError::Lagged(_)) => {}
            Err(_) => break,
        }
    }
    notices
}
