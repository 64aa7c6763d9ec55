//! Synchronization state machine using rust-fsm.
//!
//! ## State Diagram
//!
//! ```text
//! ┌─────────────────┐
//! │      Idle       │ (initial)
//! └────────┬────────┘
//!          │ Start
//!          ▼
//! ┌─────────────────┐   NoAccount    ┌─────────────────┐
//! │   Discovering   │ ─────────────► │  AwaitingUser   │
//! └────────┬────────┘ ◄───────────── └────────┬────────┘
//!          │ AccountFound     Start           │ AccountAuthorized
//!          ▼                                  │
//! ┌─────────────────┐ ◄───────────────────────┘
//! │    Connected    │ ◄──────────────┐
//! └────────┬────────┘                │
//!          │ BeginSync               │ SyncFailed
//!          ▼                         │
//! ┌─────────────────┐ ───────────────┘
//! │     Syncing     │
//! └────────┬────────┘ ◄──────────────┐
//!          │ SyncSucceeded           │ BeginSync
//!          ▼                         │
//! ┌─────────────────┐ ───────────────┘
//! │      Live       │
//! └─────────────────┘
//! ```
//!
//! `AccountAuthorized` is also accepted from Idle, Discovering, Connected and
//! Live: an explicit connect can land at any point outside a running sync.

use rust_fsm::*;
use serde::{Deserialize, Serialize};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub sync_machine(Idle)

    Idle => {
        Start => Discovering,
        AccountAuthorized => Connected
    },
    Discovering => {
        AccountFound => Connected,
        NoAccount => AwaitingUser,
        AccountAuthorized => Connected
    },
    AwaitingUser => {
        Start => Discovering,
        AccountAuthorized => Connected
    },
    Connected => {
        AccountAuthorized => Connected,
        BeginSync => Syncing
    },
    Syncing => {
        SyncSucceeded => Live,
        SyncFailed => Connected
    },
    Live => {
        AccountAuthorized => Connected,
        BeginSync => Syncing
    }
}

pub use sync_machine::Input as SyncMachineInput;
pub use sync_machine::State as SyncMachineState;
pub use sync_machine::StateMachine as SyncMachine;

/// Engine state for external consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Nothing has happened yet.
    Idle,
    /// Silently looking for an already-authorized account.
    Discovering,
    /// No authorized account; waiting for an explicit connect.
    AwaitingUser,
    /// Account known, no synced view yet (or the last sync failed).
    Connected,
    /// Subscription anchored, history being read.
    Syncing,
    /// History merged and live appends flowing.
    Live,
}

impl SyncState {
    /// Returns true once an account has been adopted.
    pub fn has_account(&self) -> bool {
        matches!(
            self,
            SyncState::Connected | SyncState::Syncing | SyncState::Live
        )
    }

    /// Returns true while a start or sync is running.
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncState::Discovering | SyncState::Syncing)
    }
}

impl From<&SyncMachineState> for SyncState {
    fn from(state: &SyncMachineState) -> Self {
        match state {
            SyncMachineState::Idle => SyncState::Idle,
            SyncMachineState::Discovering => SyncState::Discovering,
            SyncMachineState::AwaitingUser => SyncState::AwaitingUser,
            SyncMachineState::Connected => SyncState::Connected,
            SyncMachineState::Syncing => SyncState::Syncing,
            SyncMachineState::Live => SyncState::Live,
        }
    }
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SyncState::Idle => "idle",
            SyncState::Discovering => "discovering",
            SyncState::AwaitingUser => "awaiting_user",
            SyncState::Connected => "connected",
            SyncState::Syncing => "syncing",
            SyncState::Live => "live",
        };
        f.write_str(name)
    }
}

/// Whether an account is known, as the connect affordance sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connected,
}
