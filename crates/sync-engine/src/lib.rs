//! # Sync Engine
//!
//! Connects the user's wallet to the registry and keeps an in-memory view of
//! its records in step with both history and live appends.
//!
//! ## Lifecycle
//!
//! 1. [`SyncEngine::start`] silently looks for an authorized account.
//! 2. Without one the engine waits in `AwaitingUser` until
//!    [`SyncEngine::connect`] is called.
//! 3. With an account, the engine anchors a live subscription, reads the full
//!    history and merges the two (`Syncing` → `Live`).
//! 4. [`SyncEngine::refresh`] re-runs step 3 on demand; nothing is re-read on
//!    a timer.
//!
//! ## Crate Structure
//!
//! - [`engine`] - The engine and its configuration
//! - [`sync_fsm`] - rust-fsm state machine and the public state enums
//! - [`events`] - Broadcast events and user notices

pub mod engine;
mod error;
pub mod events;
pub mod sync_fsm;

#[cfg(test)]
mod tests;

pub use engine::{EngineConfig, SyncEngine, DEFAULT_GAS_CEILING};
pub use error::{SyncError, SyncResult};
pub use events::{EngineEvent, SyncNotice};
pub use sync_fsm::sync_machine;
pub use sync_fsm::{
    ConnectionState, SyncMachine, SyncMachineInput, SyncMachineState, SyncState,
};
