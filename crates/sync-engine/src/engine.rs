//! The sync engine: wallet connection lifecycle plus history/live merging.
//!
//! The engine owns the account, the state machine, the record store, the
//! current ledger client and the single live subscription. Every external
//! trigger (`start`, `connect`, `refresh`, `submit`) runs to completion on the
//! caller's task; the only background work is the ledger client's log watcher.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ledger_client::{
    Confirmation, LedgerClient, LedgerClientConfig, ListenerError, PendingSubmission, RawRecord,
    RegistryBinding, SubscriptionHandle,
};
use parking_lot::{Mutex, RwLock};
use provider_rpc::Address;
use record_store::{Record, RecordStore};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use wallet_gateway::{WalletError, WalletGateway};

use crate::sync_fsm::{SyncMachine, SyncMachineInput};
use crate::{ConnectionState, EngineEvent, SyncError, SyncNotice, SyncResult, SyncState};

/// Default gas ceiling for submissions.
pub const DEFAULT_GAS_CEILING: u64 = 300_000;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Registry deployment to talk to.
    pub binding: RegistryBinding,
    /// Gas limit attached to every submission.
    pub gas_ceiling: u64,
    /// Optional client-side message length limit, in characters.
    pub max_message_len: Option<usize>,
    /// Timing for the ledger client.
    pub ledger: LedgerClientConfig,
}

impl EngineConfig {
    pub fn new(binding: RegistryBinding) -> Self {
        Self {
            binding,
            gas_ceiling: DEFAULT_GAS_CEILING,
            max_message_len: None,
            ledger: LedgerClientConfig::default(),
        }
    }
}

struct ActiveSubscription {
    client: LedgerClient,
    handle: SubscriptionHandle,
}

/// Releases the connect in-flight flag on every exit path.
struct ConnectGuard<'a>(&'a AtomicBool);

impl<'a> ConnectGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ConnectGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Connection and synchronization engine.
pub struct SyncEngine {
    wallet: WalletGateway,
    config: EngineConfig,
    fsm: Mutex<SyncMachine>,
    account: RwLock<Option<Address>>,
    ledger: RwLock<Option<LedgerClient>>,
    subscription: Mutex<Option<ActiveSubscription>>,
    store: Arc<RecordStore>,
    event_tx: broadcast::Sender<EngineEvent>,
    connecting: AtomicBool,
}

impl SyncEngine {
    /// Creates an idle engine.
    pub fn new(wallet: WalletGateway, config: EngineConfig) -> Self {
        let (event_tx, _) = broadcast::channel(100);

        Self {
            wallet,
            config,
            fsm: Mutex::new(SyncMachine::new()),
            account: RwLock::new(None),
            ledger: RwLock::new(None),
            subscription: Mutex::new(None),
            store: Arc::new(RecordStore::new()),
            event_tx,
            connecting: AtomicBool::new(false),
        }
    }

    /// Subscribe to engine events.
    pub fn events(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    pub fn sync_state(&self) -> SyncState {
        SyncState::from(self.fsm.lock().state())
    }

    pub fn connection_state(&self) -> ConnectionState {
        match *self.account.read() {
            Some(_) => ConnectionState::Connected,
            None => ConnectionState::Disconnected,
        }
    }

    pub fn account(&self) -> Option<Address> {
        *self.account.read()
    }

    /// Current records in arrival order.
    pub fn snapshot(&self) -> Vec<Record> {
        self.store.snapshot()
    }

    /// True if a wallet provider is configured.
    pub fn wallet_available(&self) -> bool {
        self.wallet.capability()
    }

    /// Listeners registered on the current ledger client.
    pub fn listener_count(&self) -> usize {
        self.ledger
            .read()
            .as_ref()
            .map_or(0, LedgerClient::listener_count)
    }

    /// Looks for an already-authorized account without prompting.
    ///
    /// From AwaitingUser this re-runs discovery; from Connected or Live it
    /// behaves like [`refresh`](Self::refresh); while a discovery or sync is
    /// running it does nothing.
    pub async fn start(&self) -> SyncResult<()> {
        if matches!(self.sync_state(), SyncState::Connected | SyncState::Live) {
            return self.refresh().await;
        }

        if let Err(e) = self.transition(&SyncMachineInput::Start) {
            debug!(error = %e, "Start already in progress");
            return Ok(());
        }

        if !self.wallet.capability() {
            info!("No wallet provider configured");
        }

        match self.wallet.discover_authorized_account().await {
            Some(account) => {
                if self.sync_state() != SyncState::Discovering {
                    debug!(account = %account, "Discovery superseded by explicit connect");
                    return Ok(());
                }
                self.adopt_account(account)?;
                self.transition(&SyncMachineInput::AccountFound)?;
                self.sync_tolerant().await
            }
            None => {
                if self.sync_state() == SyncState::Discovering {
                    self.transition(&SyncMachineInput::NoAccount)?;
                }
                Ok(())
            }
        }
    }

    /// Prompts the user to authorize an account.
    ///
    /// Concurrent calls are coalesced: only the first one reaches the wallet,
    /// the others return the account known at that moment. A declined prompt
    /// resolves to `Ok(None)` and leaves the state unchanged.
    pub async fn connect(&self) -> SyncResult<Option<Address>> {
        if self.sync_state() == SyncState::Syncing {
            debug!("Sync in progress, connect ignored");
            return Ok(self.account());
        }

        let Some(_guard) = ConnectGuard::acquire(&self.connecting) else {
            debug!("Connect already in progress");
            return Ok(self.account());
        };

        let account = match self.wallet.request_connection().await {
            Ok(Some(account)) => account,
            Ok(None) => {
                info!("Wallet connection declined");
                self.notify(SyncNotice::Declined);
                return Ok(None);
            }
            Err(WalletError::NoProvider) => {
                warn!("Connect requested without a wallet provider");
                self.notify(SyncNotice::NoProvider);
                return Err(SyncError::NoProvider);
            }
        };

        // Discovery may have started a sync while the prompt was open.
        if self.sync_state() == SyncState::Syncing {
            if self.account() == Some(account) {
                debug!(account = %account, "Sync already running for this account");
                return Ok(Some(account));
            }
            debug!(account = %account, "Waiting for running sync before switching account");
            self.wait_for_sync().await;
        }

        self.adopt_account(account)?;
        self.transition(&SyncMachineInput::AccountAuthorized)?;
        self.sync_tolerant().await?;
        Ok(Some(account))
    }

    /// Re-reads history and merges it with live appends.
    pub async fn refresh(&self) -> SyncResult<()> {
        match self.sync_state() {
            SyncState::Connected | SyncState::Live => self.sync().await,
            SyncState::Syncing => {
                debug!("Sync already in progress");
                Ok(())
            }
            _ => Err(SyncError::NotConnected),
        }
    }

    /// Submits a new record. The store is only updated by the append event.
    pub async fn submit(&self, message: &str) -> SyncResult<PendingSubmission> {
        if !matches!(self.sync_state(), SyncState::Syncing | SyncState::Live) {
            return Err(SyncError::NotConnected);
        }

        if let Some(max) = self.config.max_message_len {
            let len = message.chars().count();
            if len > max {
                return Err(SyncError::MessageTooLong { len, max });
            }
        }

        let client = self.ledger_client()?;
        match client.submit(message, self.config.gas_ceiling).await {
            Ok(pending) => Ok(pending),
            Err(e) => {
                warn!(error = %e, "Submission failed");
                self.notify(SyncNotice::SubmissionFailed(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Waits until a submission is mined.
    pub async fn wait_for_confirmation(
        &self,
        pending: &PendingSubmission,
    ) -> SyncResult<Confirmation> {
        let client = self.ledger_client()?;
        client.wait_for_confirmation(pending).await.map_err(|e| {
            warn!(error = %e, tx_hash = %pending.tx_hash, "Confirmation failed");
            self.notify(SyncNotice::SubmissionFailed(e.to_string()));
            SyncError::from(e)
        })
    }

    /// Reads the ledger's own record counter.
    pub async fn record_count(&self) -> SyncResult<u64> {
        let client = self.ledger_client()?;
        Ok(client.record_count().await?)
    }

    /// Releases the live subscription.
    pub fn shutdown(&self) {
        self.release_subscription();
        info!("Sync engine shut down");
    }

    fn ledger_client(&self) -> SyncResult<LedgerClient> {
        self.ledger.read().clone().ok_or(SyncError::NotConnected)
    }

    /// Records `account` and makes sure the ledger client signs as it.
    fn adopt_account(&self, account: Address) -> SyncResult<()> {
        let previous = *self.account.read();
        if previous == Some(account) && self.ledger.read().is_some() {
            return Ok(());
        }

        let provider = self.wallet.provider().cloned().ok_or(SyncError::NoProvider)?;
        self.release_subscription();
        if previous.is_some_and(|old| old != account) {
            self.store.forget_live();
        }

        let client = LedgerClient::new(
            self.config.binding,
            provider,
            Some(account),
            self.config.ledger.clone(),
        );
        *self.ledger.write() = Some(client);
        *self.account.write() = Some(account);

        match previous {
            Some(old) => info!(account = %account, previous = %old, "Account switched"),
            None => info!(account = %account, "Account connected"),
        }
        let _ = self.event_tx.send(EngineEvent::AccountChanged(account));
        Ok(())
    }

    /// Returns once the engine is no longer in `Syncing`.
    async fn wait_for_sync(&self) {
        let mut rx = self.event_tx.subscribe();
        while self.sync_state() == SyncState::Syncing {
            if let Err(broadcast::error::RecvError::Closed) = rx.recv().await {
                break;
            }
        }
    }

    /// Runs a sync, swallowing recoverable failures (already logged and
    /// broadcast).
    async fn sync_tolerant(&self) -> SyncResult<()> {
        match self.sync().await {
            Err(e) if e.is_recoverable() => Ok(()),
            other => other,
        }
    }

    async fn sync(&self) -> SyncResult<()> {
        self.transition(&SyncMachineInput::BeginSync)?;

        let client = match self.ledger_client() {
            Ok(client) => client,
            Err(e) => {
                self.transition(&SyncMachineInput::SyncFailed)?;
                return Err(e);
            }
        };

        self.store.begin_replace();

        if let Err(e) = self.ensure_subscription(&client).await {
            warn!(error = %e, "Could not subscribe to live appends");
            return self.fail_sync(e.into());
        }

        match client.fetch_all().await {
            Ok(history) => {
                self.store.replace_all(history);
                self.transition(&SyncMachineInput::SyncSucceeded)?;

                let records = self.store.len();
                info!(records, "Registry synced");
                let _ = self.event_tx.send(EngineEvent::Synced { records });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "History fetch failed, keeping previous records");
                self.release_subscription();
                self.fail_sync(e.into())
            }
        }
    }

    fn fail_sync(&self, err: SyncError) -> SyncResult<()> {
        self.store.abort_replace();
        self.transition(&SyncMachineInput::SyncFailed)?;
        self.notify(SyncNotice::LedgerUnavailable(err.to_string()));
        Err(err)
    }

    /// Keeps exactly one live subscription on the current client.
    async fn ensure_subscription(&self, client: &LedgerClient) -> ledger_client::LedgerResult<()> {
        if self.subscription.lock().is_some() {
            return Ok(());
        }

        let store = self.store.clone();
        let events = self.event_tx.clone();
        let handle = client
            .subscribe(move |raw| apply_live_append(&store, &events, raw))
            .await?;

        debug!(subscription = handle.id(), "Live subscription acquired");
        *self.subscription.lock() = Some(ActiveSubscription {
            client: client.clone(),
            handle,
        });
        Ok(())
    }

    fn release_subscription(&self) {
        let active = self.subscription.lock().take();
        if let Some(active) = active {
            active.client.unsubscribe(&active.handle);
            debug!(subscription = active.handle.id(), "Live subscription released");
        }
    }

    fn notify(&self, notice: SyncNotice) {
        let _ = self.event_tx.send(EngineEvent::Notice(notice));
    }

    /// Transition the FSM and broadcast the new state if it changed.
    fn transition(&self, input: &SyncMachineInput) -> SyncResult<SyncState> {
        let mut fsm = self.fsm.lock();
        let old_state = SyncState::from(fsm.state());

        fsm.consume(input).map_err(|_| {
            SyncError::InvalidStateTransition(format!(
                "Cannot apply {:?} in state {:?}",
                input,
                fsm.state()
            ))
        })?;

        let new_state = SyncState::from(fsm.state());
        drop(fsm);

        if old_state != new_state {
            debug!(
                old_state = %old_state,
                new_state = %new_state,
                "Sync state transition"
            );
            let _ = self.event_tx.send(EngineEvent::StateChanged(new_state));
        }

        Ok(new_state)
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        self.release_subscription();
    }
}

fn apply_live_append(store: &RecordStore, events: &broadcast::Sender<EngineEvent>, raw: RawRecord) {
    let epoch_seconds = raw.epoch_seconds;
    let Some(record) = raw.into_record() else {
        let err = ListenerError::TimestampOutOfRange(epoch_seconds);
        warn!(error = %err, "Dropping live append");
        return;
    };

    if store.append(record.clone()) {
        debug!(author = %record.author(), "Live append applied");
        let _ = events.send(EngineEvent::RecordAppended(record));
    }
}
