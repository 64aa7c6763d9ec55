//! The record type held by the store.

use chrono::{DateTime, Utc};
use provider_rpc::Address;
use serde::{Deserialize, Serialize};

/// One author/timestamp/message entry from the registry.
///
/// Immutable once built. Two records with the same author, timestamp and
/// message are the same record as far as the store is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    author: Address,
    submitted_at: DateTime<Utc>,
    message: String,
}

impl Record {
    /// Creates a record from its parts.
    pub fn new(author: Address, submitted_at: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            author,
            submitted_at,
            message: message.into(),
        }
    }

    /// Creates a record from the ledger's epoch-seconds timestamp.
    ///
    /// Returns None if the seconds do not fit a UTC timestamp.
    pub fn from_epoch_seconds(
        author: Address,
        epoch_seconds: u64,
        message: impl Into<String>,
    ) -> Option<Self> {
        let seconds = i64::try_from(epoch_seconds).ok()?;
        let submitted_at = DateTime::from_timestamp(seconds, 0)?;
        Some(Self::new(author, submitted_at, message))
    }

    /// The account that submitted the record.
    pub fn author(&self) -> &Address {
        &self.author
    }

    /// When the ledger accepted the record.
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Seconds since the Unix epoch, as stored on the ledger.
    pub fn epoch_seconds(&self) -> i64 {
        self.submitted_at.timestamp()
    }

    /// The record text.
    pub fn message(&self) -> &str {
        &self.message
    }
}
