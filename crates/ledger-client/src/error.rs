//! Ledger client error types.

use provider_rpc::ProviderError;
use thiserror::Error;

use crate::abi::AbiError;

/// A history or informational read failed.
///
/// Recoverable: callers log it and keep whatever view they already had.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// RPC/provider failure.
    #[error("ledger read failed: {0}")]
    Read(#[from] ProviderError),

    /// The ledger answered with data that does not match the interface.
    #[error("ledger returned undecodable data: {0}")]
    Abi(#[from] AbiError),

    /// A record's epoch seconds do not fit a timestamp.
    #[error("record timestamp out of range: {0}")]
    TimestampOutOfRange(u64),
}

/// A state-changing call failed.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The client was built without a signer account.
    #[error("no connected signer")]
    NoSigner,

    /// The user declined to sign in the wallet.
    #[error("submission rejected in wallet")]
    Rejected,

    /// The transaction was mined but reverted.
    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    /// Wallet, funds or network failure reported by the provider.
    #[error("submission failed: {0}")]
    Provider(ProviderError),

    /// The provider answered with something that is not a transaction hash
    /// or receipt.
    #[error("unexpected submission response: {0}")]
    InvalidResponse(String),
}

impl From<ProviderError> for SubmissionError {
    fn from(err: ProviderError) -> Self {
        if err.is_user_rejected() {
            SubmissionError::Rejected
        } else {
            SubmissionError::Provider(err)
        }
    }
}

/// A live append event could not be turned into a record.
///
/// The event is dropped; the subscription keeps running.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The log object is missing fields or has the wrong shape.
    #[error("malformed log: {0}")]
    MalformedLog(String),

    /// The log belongs to a different event.
    #[error("unexpected event topic {0}")]
    UnexpectedTopic(String),

    /// The log data does not decode.
    #[error("undecodable log data: {0}")]
    Abi(#[from] AbiError),

    /// The event's epoch seconds do not fit a timestamp.
    #[error("event timestamp out of range: {0}")]
    TimestampOutOfRange(u64),
}

/// Result type alias using LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Result type alias using SubmissionError.
pub type SubmissionResult<T> = Result<T, SubmissionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_rejection_maps_to_rejected() {
        let err: SubmissionError = ProviderError::user_rejected().into();
        assert!(matches!(err, SubmissionError::Rejected));
    }

    #[test]
    fn test_other_provider_failure_is_kept() {
        let err: SubmissionError = ProviderError::Rpc {
            code: -32000,
            message: "insufficient funds for gas * price + value".to_string(),
        }
        .into();
        match err {
            SubmissionError::Provider(inner) => {
                assert!(inner.to_string().contains("insufficient funds"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
