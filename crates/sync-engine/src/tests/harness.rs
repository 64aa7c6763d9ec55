//! Test harness for engine scenarios.
//!
//! Provides:
//! - TestHarness: a SyncEngine wired to a ScriptedProvider that doubles as
//!   the wallet and the node, with a ScriptedRegistry behind `eth_call` and
//!   `eth_getLogs`
//! - wait_until: polling helper for background delivery

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use ledger_client::testing::ScriptedRegistry;
use ledger_client::{LedgerClientConfig, RegistryBinding};
use provider_rpc::testing::ScriptedProvider;
use provider_rpc::{Address, SharedProvider, USER_REJECTED_CODE};
use serde_json::json;
use tokio::sync::broadcast;
use wallet_gateway::WalletGateway;

use crate::{EngineConfig, EngineEvent, SyncEngine, SyncNotice};

pub const TX_HASH: &str = "0x5e1ec7ed00000000000000000000000000000000000000000000000000000042";

pub fn registry_address() -> Address {
    "0x7Ee8a1cDe62d295E5222B3303c065B1d5E262b14".parse().unwrap()
}

pub fn test_config() -> EngineConfig {
    let mut config = EngineConfig::new(RegistryBinding::v1(registry_address()));
    config.ledger = LedgerClientConfig {
        poll_interval: Duration::from_millis(10),
        confirmation_poll_interval: Duration::from_millis(5),
    };
    config
}

pub struct TestHarness {
    pub provider: Arc<ScriptedProvider>,
    pub registry: ScriptedRegistry,
    pub engine: SyncEngine,
}

impl TestHarness {
    /// Wallet with no pre-authorized account.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Wallet that already authorized `account`.
    pub fn authorized(account: Address) -> Self {
        let harness = Self::new();
        harness.set_authorized(Some(account));
        harness
    }

    pub fn with_config(adjust: impl FnOnce(&mut EngineConfig)) -> Self {
        let mut config = test_config();
        adjust(&mut config);

        let provider = Arc::new(ScriptedProvider::new());
        provider.respond("eth_accounts", json!([]));
        let registry = ScriptedRegistry::install(&provider, config.binding);

        let shared: SharedProvider = provider.clone();
        let engine = SyncEngine::new(WalletGateway::new(Some(shared)), config);

        Self {
            provider,
            registry,
            engine,
        }
    }

    /// Sets what `eth_accounts` reports.
    pub fn set_authorized(&self, account: Option<Address>) {
        let accounts: Vec<String> = account.iter().map(ToString::to_string).collect();
        self.provider.respond("eth_accounts", json!(accounts));
    }

    /// Makes the next prompts approve `account`.
    pub fn approve_connect(&self, account: Address) {
        self.provider
            .respond("eth_requestAccounts", json!([account.to_string()]));
    }

    /// Makes the next prompts decline.
    pub fn reject_connect(&self) {
        self.provider
            .fail("eth_requestAccounts", USER_REJECTED_CODE, "User rejected the request.");
    }

    /// Epoch seconds of the visible records, in order.
    pub fn epochs(&self) -> Vec<i64> {
        self.engine
            .snapshot()
            .iter()
            .map(|r| r.epoch_seconds())
            .collect()
    }

    /// Waits until `method` has been requested at least `count` times.
    pub async fn wait_for_calls(&self, method: &str, count: usize) -> bool {
        wait_until(|| async move { self.provider.call_count(method) >= count }).await
    }

    /// Waits until the store holds `count` records.
    pub async fn wait_for_records(&self, count: usize) -> bool {
        wait_until(|| async move { self.engine.snapshot().len() == count }).await
    }
}

/// Engine without any wallet provider.
pub fn engine_without_wallet() -> SyncEngine {
    SyncEngine::new(WalletGateway::without_provider(), test_config())
}

/// Polls `condition` until it holds or two seconds pass.
pub async fn wait_until<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// Everything currently buffered on an event receiver.
pub fn drain(rx: &mut broadcast::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn notices(events: &[EngineEvent]) -> Vec<SyncNotice> {
    events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::Notice(notice) => Some(notice.clone()),
            _ => None,
        })
        .collect()
}
