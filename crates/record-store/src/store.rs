//! The record store.
//!
//! # Invariants
//!
//! - Order is arrival order: history keeps ledger order, live appends go last
//! - No two identical records are ever visible at once
//! - A live append stays visible across replaces until `forget_live`
//!
//! # Replace
//!
//! ```text
//! append(r3)            begin_replace()          replace_all([r1, r2])
//!     │                       │                          │
//!     ▼                       ▼                          ▼
//!  live = [r3]         replacing = true        visible = [r1, r2] ∪ live
//! ```

use std::collections::HashSet;
use parking_lot::RwLock;
use tracing::debug;

use crate::Record;

#[derive(Debug, Default)]
struct StoreState {
    records: Vec<Record>,
    index: HashSet<Record>,
    /// Every accepted append, in arrival order.
    live: Vec<Record>,
    replacing: bool,
}

impl StoreState {
    fn push_unique(&mut self, record: Record) -> bool {
        if self.index.contains(&record) {
            return false;
        }
        self.index.insert(record.clone());
        self.records.push(record);
        true
    }
}

/// Ordered, deduplicated collection of records.
///
/// The store never changes on its own; every mutation comes from a caller.
#[derive(Debug, Default)]
pub struct RecordStore {
    state: RwLock<StoreState>,
}

impl RecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a bulk replace as pending.
    ///
    /// Appends keep landing while the history is fetched; `replace_all`
    /// re-applies them on top of it.
    pub fn begin_replace(&self) {
        self.state.write().replacing = true;
    }

    /// Returns true while a bulk replace is pending.
    pub fn is_replace_pending(&self) -> bool {
        self.state.read().replacing
    }

    /// Atomically replaces the whole sequence with `records`.
    ///
    /// Duplicates inside `records` collapse to their first occurrence. Every
    /// live append seen so far is re-applied afterwards in arrival order,
    /// skipping any already present in the history.
    pub fn replace_all(&self, records: Vec<Record>) {
        let mut state = self.state.write();
        let live = std::mem::take(&mut state.live);

        let fetched = records.len();
        state.records = Vec::with_capacity(fetched + live.len());
        state.index = HashSet::with_capacity(fetched + live.len());

        for record in records {
            state.push_unique(record);
        }
        let history = state.records.len();

        let mut reapplied = 0;
        for record in &live {
            if state.push_unique(record.clone()) {
                reapplied += 1;
            }
        }
        state.live = live;
        state.replacing = false;

        debug!(
            fetched,
            history,
            reapplied,
            total = state.records.len(),
            "Record store replaced"
        );
    }

    /// Drops a pending replace, keeping the visible records as they are.
    pub fn abort_replace(&self) {
        let mut state = self.state.write();
        if state.replacing {
            state.replacing = false;
            debug!("Pending record replace aborted");
        }
    }

    /// Stops carrying earlier live appends into future replaces.
    ///
    /// Visible records are untouched; the next `replace_all` shows history
    /// plus whatever arrives from now on.
    pub fn forget_live(&self) {
        let mut state = self.state.write();
        let dropped = state.live.len();
        state.live.clear();
        debug!(dropped, "Live appends forgotten");
    }

    /// Appends a record unless an identical one is already present.
    ///
    /// Returns true if the record was added.
    pub fn append(&self, record: Record) -> bool {
        let mut state = self.state.write();
        if state.index.contains(&record) {
            return false;
        }
        state.live.push(record.clone());
        state.push_unique(record)
    }

    /// Returns the current ordered sequence.
    pub fn snapshot(&self) -> Vec<Record> {
        self.state.read().records.clone()
    }

    /// Returns true if an identical record is present.
    pub fn contains(&self, record: &Record) -> bool {
        self.state.read().index.contains(record)
    }

    /// Number of visible records.
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    /// Returns true if no records are visible.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
