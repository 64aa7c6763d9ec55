//! # Record Store
//!
//! The portal's in-memory view of the registry: an ordered sequence of
//! [`Record`]s with no duplicates. History replaces the sequence in bulk,
//! live events append to it, and every live append is carried across later
//! replaces so none disappear from view.
//!
//! ```rust
//! use record_store::{Record, RecordStore};
//!
//! let author = "0x00000000000000000000000000000000000000a1".parse().unwrap();
//! let store = RecordStore::new();
//!
//! store.begin_replace();
//! store.append(Record::from_epoch_seconds(author, 3000, "live").unwrap());
//! store.replace_all(vec![Record::from_epoch_seconds(author, 1000, "history").unwrap()]);
//!
//! let times: Vec<i64> = store.snapshot().iter().map(|r| r.epoch_seconds()).collect();
//! assert_eq!(times, vec![1000, 3000]);
//! ```

mod record;
mod store;

pub use record::Record;
pub use store::RecordStore;
