//! Client tests against a simulated registry.
//!
//! - `reads.rs`         - History and counter reads
//! - `submissions.rs`   - Transaction submission and confirmation
//! - `subscriptions.rs` - Live append delivery and listener lifecycle


use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use provider_rpc::testing::ScriptedProvider;

use crate::testing::{author, ScriptedRegistry};
use crate::{LedgerClient, LedgerClientConfig, RegistryBinding};

pub(crate) fn registry_address() -> provider_rpc::Address {
    "0x7Ee8a1cDe62d295E5222B3303c065B1d5E262b14".parse().unwrap()
}

pub(crate) fn fast_config() -> LedgerClientConfig {
    LedgerClientConfig {
        poll_interval: Duration::from_millis(10),
        confirmation_poll_interval: Duration::from_millis(5),
    }
}

/// Provider, simulated registry and a client signing as `author(1)`.
pub(crate) fn setup() -> (Arc<ScriptedProvider>, ScriptedRegistry, LedgerClient) {
    let provider = Arc::new(ScriptedProvider::new());
    let registry = ScriptedRegistry::install(&provider, RegistryBinding::v1(registry_address()));
    let client = LedgerClient::new(
        registry.binding(),
        provider.clone(),
        Some(author(1)),
        fast_config(),
    );
    (provider, registry, client)
}

/// Polls `condition` until it holds or two seconds pass.
pub(crate) async fn wait_until<F, Fut>(mut condition: F) -> bool
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
