//! Registry client bound to one provider, one contract and an optional signer.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use provider_rpc::{
    decode_data, encode_data, parse_quantity, to_quantity, Address, ProviderError, SharedProvider,
};
use record_store::Record;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::abi;
use crate::binding::RegistryBinding;
use crate::listeners::{AppendListener, ListenerHub, SubscriptionHandle};
use crate::record::decode_record_added;
use crate::{LedgerError, LedgerResult, RawRecord, SubmissionError, SubmissionResult};

/// Default interval between `eth_getLogs` polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(4);

/// Default interval between receipt polls while waiting for confirmation.
pub const DEFAULT_CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Timing knobs for the client.
#[derive(Debug, Clone)]
pub struct LedgerClientConfig {
    pub poll_interval: Duration,
    pub confirmation_poll_interval: Duration,
}

impl Default for LedgerClientConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            confirmation_poll_interval: DEFAULT_CONFIRMATION_POLL_INTERVAL,
        }
    }
}

/// A submitted but not yet confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub tx_hash: String,
}

/// A mined, successful transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: String,
    pub block_number: u64,
}

/// Client for the registry contract.
///
/// Cheap to clone; clones share the listener set and the log watcher.
#[derive(Clone)]
pub struct LedgerClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    binding: RegistryBinding,
    provider: SharedProvider,
    signer: Option<Address>,
    config: LedgerClientConfig,
    listeners: ListenerHub,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        if let Some(handle) = self.watcher.get_mut().take() {
            handle.abort();
        }
    }
}

impl LedgerClient {
    /// Creates a client. Without a signer only reads and subscriptions work.
    pub fn new(
        binding: RegistryBinding,
        provider: SharedProvider,
        signer: Option<Address>,
        config: LedgerClientConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                binding,
                provider,
                signer,
                config,
                listeners: ListenerHub::new(),
                watcher: Mutex::new(None),
            }),
        }
    }

    pub fn binding(&self) -> &RegistryBinding {
        &self.inner.binding
    }

    pub fn signer(&self) -> Option<&Address> {
        self.inner.signer.as_ref()
    }

    /// Reads the full ledger history in ledger order.
    pub async fn fetch_all(&self) -> LedgerResult<Vec<Record>> {
        let selector = self.inner.binding.interface.get_all_records();
        let data = self.inner.call(abi::encode_call(selector)).await?;
        let raw = abi::decode_records(&data)?;

        let records = raw
            .into_iter()
            .map(|r| {
                let secs = r.epoch_seconds;
                r.into_record().ok_or(LedgerError::TimestampOutOfRange(secs))
            })
            .collect::<LedgerResult<Vec<_>>>()?;

        debug!(count = records.len(), "Fetched ledger history");
        Ok(records)
    }

    /// Reads the ledger's own record counter.
    pub async fn record_count(&self) -> LedgerResult<u64> {
        let selector = self.inner.binding.interface.get_record_count();
        let data = self.inner.call(abi::encode_call(selector)).await?;
        Ok(abi::decode_u64(&data)?)
    }

    /// Sends a signed `submitRecord` transaction.
    ///
    /// Returns once the wallet has accepted and broadcast it; use
    /// [`wait_for_confirmation`](Self::wait_for_confirmation) to wait for
    /// inclusion.
    pub async fn submit(
        &self,
        message: &str,
        gas_ceiling: u64,
    ) -> SubmissionResult<PendingSubmission> {
        let signer = self.inner.signer.ok_or(SubmissionError::NoSigner)?;
        let binding = &self.inner.binding;
        let data = abi::encode_string_call(binding.interface.submit_record(), message);

        let params = json!([{
            "from": signer.to_string(),
            "to": binding.address.to_string(),
            "data": encode_data(&data),
            "gas": to_quantity(gas_ceiling),
        }]);

        let result = self
            .inner
            .provider
            .request("eth_sendTransaction", params)
            .await?;

        let tx_hash = result
            .as_str()
            .ok_or_else(|| SubmissionError::InvalidResponse(result.to_string()))?
            .to_string();

        info!(tx_hash = %tx_hash, from = %signer, "Submission broadcast");
        Ok(PendingSubmission { tx_hash })
    }

    /// Polls for the transaction receipt until it is mined.
    pub async fn wait_for_confirmation(
        &self,
        pending: &PendingSubmission,
    ) -> SubmissionResult<Confirmation> {
        loop {
            let receipt = self
                .inner
                .provider
                .request("eth_getTransactionReceipt", json!([pending.tx_hash]))
                .await?;

            if !receipt.is_null() {
                return parse_receipt(&pending.tx_hash, &receipt);
            }

            tokio::time::sleep(self.inner.config.confirmation_poll_interval).await;
        }
    }

    /// Registers a callback for every future append event.
    ///
    /// The log cursor is anchored at the current head before this returns,
    /// so any append mined from that block on is delivered.
    pub async fn subscribe<F>(&self, on_append: F) -> LedgerResult<SubscriptionHandle>
    where
        F: Fn(RawRecord) + Send + Sync + 'static,
    {
        let head = self.inner.block_number().await?;
        let listener: AppendListener = Arc::new(on_append);

        let mut watcher = self.inner.watcher.lock();
        let handle = self.inner.listeners.register(listener);

        let running = watcher.as_ref().is_some_and(|h| !h.is_finished());
        if !running {
            *watcher = Some(spawn_watcher(&self.inner, head));
        }

        debug!(
            subscription = handle.id(),
            from_block = head,
            listeners = self.inner.listeners.len(),
            "Subscribed to RecordAdded"
        );
        Ok(handle)
    }

    /// Removes a listener. Returns false if it was already removed.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        let mut watcher = self.inner.watcher.lock();
        let removed = self.inner.listeners.remove(*handle);

        if removed && self.inner.listeners.len() == 0 {
            if let Some(task) = watcher.take() {
                task.abort();
            }
        }

        debug!(subscription = handle.id(), removed, "Unsubscribed from RecordAdded");
        removed
    }

    /// Number of currently registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }
}

impl ClientInner {
    async fn call(&self, data: Vec<u8>) -> LedgerResult<Vec<u8>> {
        let params = json!([
            {
                "to": self.binding.address.to_string(),
                "data": encode_data(&data),
            },
            "latest"
        ]);

        let result = self.provider.request("eth_call", params).await?;
        let raw = result.as_str().ok_or_else(|| {
            ProviderError::InvalidResponse(format!("eth_call returned {result}"))
        })?;
        Ok(decode_data(raw)?)
    }

    async fn block_number(&self) -> Result<u64, ProviderError> {
        let result = self.provider.request("eth_blockNumber", json!([])).await?;
        let raw = result.as_str().ok_or_else(|| {
            ProviderError::InvalidResponse(format!("eth_blockNumber returned {result}"))
        })?;
        parse_quantity(raw)
    }

    /// Delivers logs in `[cursor, head]` and returns the next cursor.
    async fn poll_logs(&self, cursor: u64) -> Result<u64, ProviderError> {
        let head = self.block_number().await?;
        if head < cursor {
            return Ok(cursor);
        }

        let filter = json!([{
            "address": self.binding.address.to_string(),
            "topics": [self.binding.interface.record_added_topic()],
            "fromBlock": to_quantity(cursor),
            "toBlock": to_quantity(head),
        }]);
        let result = self.provider.request("eth_getLogs", filter).await?;
        let logs = result.as_array().ok_or_else(|| {
            ProviderError::InvalidResponse(format!("eth_getLogs returned {result}"))
        })?;

        for log in logs {
            match decode_record_added(log, self.binding.interface) {
                Ok(Some(record)) => self.listeners.notify(&record),
                Ok(None) => debug!("Skipping removed RecordAdded log"),
                Err(e) => warn!(error = %e, "Dropping undecodable RecordAdded log"),
            }
        }

        Ok(head + 1)
    }
}

fn spawn_watcher(inner: &Arc<ClientInner>, from_block: u64) -> JoinHandle<()> {
    let weak: Weak<ClientInner> = Arc::downgrade(inner);
    let interval = inner.config.poll_interval;

    tokio::spawn(async move {
        let mut cursor = from_block;
        loop {
            tokio::time::sleep(interval).await;

            let Some(inner) = weak.upgrade() else {
                break;
            };
            if inner.listeners.len() == 0 {
                break;
            }

            match inner.poll_logs(cursor).await {
                Ok(next) => cursor = next,
                Err(e) => warn!(error = %e, cursor, "RecordAdded poll failed, will retry"),
            }
        }
        debug!("RecordAdded watcher stopped");
    })
}

fn parse_receipt(tx_hash: &str, receipt: &Value) -> SubmissionResult<Confirmation> {
    let field = |name: &str| {
        receipt
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| SubmissionError::InvalidResponse(format!("receipt missing {name}")))
    };

    let status = parse_quantity(field("status")?)?;
    let block_number = parse_quantity(field("blockNumber")?)?;

    if status != 1 {
        warn!(tx_hash, block_number, "Submission reverted");
        return Err(SubmissionError::Reverted {
            tx_hash: tx_hash.to_string(),
        });
    }

    info!(tx_hash, block_number, "Submission confirmed");
    Ok(Confirmation {
        tx_hash: tx_hash.to_string(),
        block_number,
    })
}
