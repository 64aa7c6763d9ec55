//! Engine scenarios against a scripted wallet and a simulated registry.
//!
//! - `harness.rs`       - Engine + provider + registry wiring
//! - `lifecycle.rs`     - Start, discovery and state transitions
//! - `connect.rs`       - Explicit connect: no provider, decline, coalescing
//! - `merge.rs`         - History/live merging and failure retention
//! - `submit.rs`        - Submissions and informational reads
//! - `subscriptions.rs` - Listener acquire/release accounting
//! - `end_to_end.rs`    - Full discovery → history → live flow

mod end_to_end;
mod harness;
mod lifecycle;
mod merge;
