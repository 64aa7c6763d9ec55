//! Full discovery → history → live flow.

use ledger_client::testing::raw_record;
use ledger_client::RawRecord;
use provider_rpc::Address;
use serde_json::json;

use super::harness::{TestHarness, TX_HASH};
use crate::{ConnectionState, SyncState};

fn account_a1() -> Address {
    "0xA1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1".parse().unwrap()
}

#[tokio::test]
async fn discovery_history_and_live_merge() {
    let h = TestHarness::authorized(account_a1());
    h.registry
        .seed_history(vec![raw_record(2, 1000, "first"), raw_record(3, 2000, "second")]);

    h.engine.start().await.unwrap();
    h.registry.mine(raw_record(4, 3000, "third"));

    assert!(h.wait_for_records(3).await);
    assert_eq!(h.epochs(), vec![1000, 2000, 3000]);
    assert_eq!(h.engine.account(), Some(account_a1()));
    assert_eq!(h.engine.connection_state(), ConnectionState::Connected);
    assert_eq!(h.engine.sync_state(), SyncState::Live);

    let messages: Vec<String> = h
        .engine
        .snapshot()
        .iter()
        .map(|r| r.message().to_string())
        .collect();
    assert_eq!(messages, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn connect_submit_confirm_and_see_own_record() {
    let h = TestHarness::new();
    h.registry.seed_history(vec![raw_record(2, 1000, "first")]);

    h.engine.start().await.unwrap();
    assert_eq!(h.engine.sync_state(), SyncState::AwaitingUser);

    h.approve_connect(account_a1());
    h.engine.connect().await.unwrap();
    assert_eq!(h.engine.sync_state(), SyncState::Live);

    let before = h.engine.record_count().await.unwrap();
    h.provider.respond("eth_sendTransaction", json!(TX_HASH));
    let pending = h.engine.submit("waving hello").await.unwrap();

    let block = h.registry.mine(RawRecord {
        author: account_a1(),
        epoch_seconds: 4000,
        message: "waving hello".to_string(),
    });
    h.provider.respond(
        "eth_getTransactionReceipt",
        json!({ "transactionHash": TX_HASH, "status": "0x1", "blockNumber": format!("{block:#x}") }),
    );

    let confirmation = h.engine.wait_for_confirmation(&pending).await.unwrap();
    assert_eq!(confirmation.block_number, block);
    assert_eq!(h.engine.record_count().await.unwrap(), before + 1);

    assert!(h.wait_for_records(2).await);
    let last = h.engine.snapshot().pop().unwrap();
    assert_eq!(last.author(), &account_a1());
    assert_eq!(last.message(), "waving hello");
}
