//! Events broadcast by the engine to the user-facing surface.

use provider_rpc::Address;
use record_store::Record;

use crate::SyncState;

/// Something the user should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncNotice {
    /// No wallet is configured. Blocking: nothing can be connected.
    NoProvider,
    /// The user declined the connection request.
    Declined,
    /// History could not be read; the previous view is kept.
    LedgerUnavailable(String),
    /// A submission failed; the user may retry.
    SubmissionFailed(String),
}

impl std::fmt::Display for SyncNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncNotice::NoProvider => {
                write!(f, "No wallet found. Configure a wallet RPC endpoint to connect.")
            }
            SyncNotice::Declined => write!(f, "Wallet connection was declined."),
            SyncNotice::LedgerUnavailable(reason) => {
                write!(f, "Could not load records: {reason}")
            }
            SyncNotice::SubmissionFailed(reason) => write!(f, "Submission failed: {reason}"),
        }
    }
}

/// Events emitted by the sync engine.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The engine state machine moved.
    StateChanged(SyncState),
    /// An account was adopted (first connect or a switch).
    AccountChanged(Address),
    /// History was merged; `records` is the store size afterwards.
    Synced { records: usize },
    /// A live append was added to the store.
    RecordAppended(Record),
    /// User-facing notice.
    Notice(SyncNotice),
}
