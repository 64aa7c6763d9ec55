//! History/live merging and failure retention.

use std::time::Duration;

use ledger_client::testing::{author, raw_record, record_added_log};
use ledger_client::RawRecord;
use serde_json::json;

use super::harness::{drain, notices, TestHarness, TX_HASH};
use crate::{SyncError, SyncNotice, SyncState};
use provider_rpc::testing::ScriptedResponse;

fn live_only(h: &TestHarness, record: &RawRecord) -> u64 {
    h.registry
        .mine_log(record_added_log(&h.registry.binding(), record, 0))
}

#[tokio::test]
async fn history_then_live_in_order() {
    let h = TestHarness::authorized(author(0xa1));
    h.registry
        .seed_history(vec![raw_record(2, 1000, "one"), raw_record(3, 2000, "two")]);
    h.engine.start().await.unwrap();

    h.registry.mine(raw_record(4, 3000, "three"));

    assert!(h.wait_for_records(3).await);
    assert_eq!(h.epochs(), vec![1000, 2000, 3000]);
}

#[tokio::test]
async fn live_append_during_fetch_lands_after_history() {
    let h = TestHarness::authorized(author(0xa1));
    h.registry
        .seed_history(vec![raw_record(2, 1000, "one"), raw_record(3, 2000, "two")]);
    let gate = h.provider.gate("eth_call");

    let driver = async {
        assert!(h.wait_for_calls("eth_call", 1).await);
        live_only(&h, &raw_record(4, 3000, "three"));
        assert!(h.wait_for_records(1).await);
        assert_eq!(h.engine.sync_state(), SyncState::Syncing);
        gate.notify_one();
    };
    let (started, ()) = tokio::join!(h.engine.start(), driver);

    started.unwrap();
    assert_eq!(h.engine.sync_state(), SyncState::Live);
    assert_eq!(h.epochs(), vec![1000, 2000, 3000]);
}

#[tokio::test]
async fn live_append_also_in_history_is_not_duplicated() {
    let h = TestHarness::authorized(author(0xa1));
    h.registry
        .seed_history(vec![raw_record(2, 1000, "one"), raw_record(3, 2000, "two")]);
    let gate = h.provider.gate("eth_call");

    let driver = async {
        assert!(h.wait_for_calls("eth_call", 1).await);
        h.registry.mine(raw_record(4, 3000, "three"));
        assert!(h.wait_for_records(1).await);
        gate.notify_one();
    };
    let (started, ()) = tokio::join!(h.engine.start(), driver);

    started.unwrap();
    assert_eq!(h.epochs(), vec![1000, 2000, 3000]);
}

#[tokio::test]
async fn refresh_keeps_live_appends_missing_from_history() {
    let h = TestHarness::authorized(author(0xa1));
    h.registry.seed_history(vec![raw_record(2, 1000, "one")]);
    h.engine.start().await.unwrap();

    live_only(&h, &raw_record(3, 3000, "seen live"));
    assert!(h.wait_for_records(2).await);
    assert_eq!(h.epochs(), vec![1000, 3000]);

    h.engine.refresh().await.unwrap();

    assert_eq!(h.engine.sync_state(), SyncState::Live);
    assert_eq!(h.epochs(), vec![1000, 3000]);
}

#[tokio::test]
async fn submit_then_event_counts_once() {
    let h = TestHarness::authorized(author(0xa1));
    h.registry.seed_history(vec![raw_record(2, 1000, "one")]);
    h.engine.start().await.unwrap();
    h.provider.respond("eth_sendTransaction", json!(TX_HASH));

    h.engine.submit("gm").await.unwrap();
    assert_eq!(h.epochs(), vec![1000]);

    h.registry.mine(raw_record(0xa1, 5000, "gm"));
    assert!(h.wait_for_records(2).await);

    h.engine.refresh().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(h.epochs(), vec![1000, 5000]);
}

#[tokio::test]
async fn repeated_live_event_collapses() {
    let h = TestHarness::authorized(author(0xa1));
    h.engine.start().await.unwrap();

    let record = raw_record(2, 3000, "echo");
    live_only(&h, &record);
    live_only(&h, &record);
    h.registry.mine(raw_record(2, 3001, "marker"));

    assert!(h.wait_for_records(2).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.epochs(), vec![3000, 3001]);
}

#[tokio::test]
async fn undecodable_live_timestamp_is_dropped() {
    let h = TestHarness::authorized(author(0xa1));
    h.engine.start().await.unwrap();

    live_only(&h, &raw_record(2, u64::MAX, "too late"));
    live_only(&h, &raw_record(2, 3000, "fine"));

    assert!(h.wait_for_records(1).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.epochs(), vec![3000]);
    assert_eq!(h.engine.sync_state(), SyncState::Live);
}

#[tokio::test]
async fn fetch_failure_keeps_previous_records() {
    let h = TestHarness::authorized(author(0xa1));
    h.registry.seed_history(vec![raw_record(2, 1000, "kept")]);
    h.engine.start().await.unwrap();
    let mut rx = h.engine.events();

    h.provider.push(
        "eth_call",
        ScriptedResponse::RpcError {
            code: -32603,
            message: "header not found".to_string(),
        },
    );
    let err = h.engine.refresh().await.unwrap_err();

    assert!(matches!(err, SyncError::LedgerRead(_)));
    assert!(err.is_recoverable());
    assert_eq!(h.engine.sync_state(), SyncState::Connected);
    assert_eq!(h.epochs(), vec![1000]);
    assert_eq!(h.engine.listener_count(), 0);
    assert!(matches!(
        notices(&drain(&mut rx)).as_slice(),
        [SyncNotice::LedgerUnavailable(_)]
    ));

    h.engine.refresh().await.unwrap();
    assert_eq!(h.engine.sync_state(), SyncState::Live);
    assert_eq!(h.engine.listener_count(), 1);
}

#[tokio::test]
async fn first_fetch_failure_leaves_empty_view() {
    let h = TestHarness::authorized(author(0xa1));
    h.provider.push(
        "eth_call",
        ScriptedResponse::Transport("connection refused".to_string()),
    );

    // Start swallows the read failure; it is logged and broadcast instead.
    h.engine.start().await.unwrap();

    assert_eq!(h.engine.sync_state(), SyncState::Connected);
    assert!(h.engine.snapshot().is_empty());
    assert_eq!(h.engine.listener_count(), 0);
}
