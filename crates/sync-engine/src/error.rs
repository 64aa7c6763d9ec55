//! Engine error types.

use ledger_client::{LedgerError, SubmissionError};
use thiserror::Error;

/// Errors surfaced by the sync engine.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No wallet provider is configured.
    #[error("no wallet provider available; configure a wallet RPC endpoint")]
    NoProvider,

    /// The user declined to sign.
    #[error("request rejected in wallet")]
    UserRejected,

    /// History or counter read failed. The previous view is kept.
    #[error("ledger read failed: {0}")]
    LedgerRead(#[from] LedgerError),

    /// A submission failed before or after broadcast.
    #[error("submission failed: {0}")]
    Submission(SubmissionError),

    /// The operation needs a connected account and a synced registry.
    #[error("not connected to the registry")]
    NotConnected,

    /// The message exceeds the configured length limit.
    #[error("message is {len} characters, limit is {max}")]
    MessageTooLong { len: usize, max: usize },

    /// Invalid state transition attempted.
    #[error("invalid state transition: {0}")]
    InvalidStateTransition(String),
}

impl SyncError {
    /// Returns true if the failure waits for the next user action rather
    /// than indicating a broken engine.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SyncError::InvalidStateTransition(_))
    }
}

impl From<SubmissionError> for SyncError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Rejected => SyncError::UserRejected,
            other => SyncError::Submission(other),
        }
    }
}

/// Result type alias using SyncError.
pub type SyncResult<T> = Result<T, SyncError>;
