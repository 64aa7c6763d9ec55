//! # Ledger Client
//!
//! Typed access to the registry contract through an EIP-1193 provider.
//!
//! A [`LedgerClient`] is bound to one provider, one [`RegistryBinding`]
//! (contract address plus call interface) and optionally a signer account.
//! It reads the full history, submits new records, and delivers live
//! `RecordAdded` events to registered listeners by polling `eth_getLogs`.
//!
//! ## Crate Structure
//!
//! - [`abi`] - Minimal ABI codec for the registry's calls and event
//! - [`binding`] - Contract address and versioned interface
//! - [`client`] - The client: reads, submissions, subscriptions
//! - [`record`] - Raw ledger records and log decoding
//! - `testing` - Simulated registry for tests (feature `testing`)
//!
//! ## Delivery
//!
//! Subscriptions anchor their log cursor at the head block observed when
//! `subscribe` is called. Events are delivered at least once from that block
//! on; a failed poll is retried from the same cursor.

pub mod abi;
pub mod binding;
pub mod client;
mod error;
mod listeners;
pub mod record;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[cfg(test)]
mod tests;

pub use binding::{RegistryBinding, RegistryInterface};
pub use client::{
    Confirmation, LedgerClient, LedgerClientConfig, PendingSubmission,
    DEFAULT_CONFIRMATION_POLL_INTERVAL, DEFAULT_POLL_INTERVAL,
};
pub use error::{LedgerError, LedgerResult, ListenerError, SubmissionError, SubmissionResult};
pub use listeners::{AppendListener, SubscriptionHandle};
pub use record::{decode_record_added, RawRecord};
