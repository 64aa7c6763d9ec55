//! Start, discovery and state transitions.

use serde_json::json;

use super::harness::{drain, engine_without_wallet, TestHarness};
use crate::{ConnectionState, EngineEvent, SyncError, SyncState};
use ledger_client::testing::{author, raw_record};

#[tokio::test]
async fn start_without_authorized_account_awaits_user() {
    let h = TestHarness::new();

    h.engine.start().await.unwrap();

    assert_eq!(h.engine.sync_state(), SyncState::AwaitingUser);
    assert_eq!(h.engine.connection_state(), ConnectionState::Disconnected);
    assert_eq!(h.engine.account(), None);
    assert_eq!(h.provider.call_count("eth_requestAccounts"), 0);
    assert_eq!(h.provider.call_count("eth_call"), 0);
    assert_eq!(h.engine.listener_count(), 0);
}

#[tokio::test]
async fn start_with_authorized_account_goes_live() {
    let h = TestHarness::authorized(author(0xa1));
    h.registry.seed_history(vec![raw_record(2, 1000, "hello")]);

    h.engine.start().await.unwrap();

    assert_eq!(h.engine.sync_state(), SyncState::Live);
    assert_eq!(h.engine.connection_state(), ConnectionState::Connected);
    assert_eq!(h.engine.account(), Some(author(0xa1)));
    assert_eq!(h.epochs(), vec![1000]);
    assert_eq!(h.engine.listener_count(), 1);
    assert_eq!(h.provider.call_count("eth_requestAccounts"), 0);
}

#[tokio::test]
async fn start_again_from_awaiting_user_rediscovers() {
    let h = TestHarness::new();
    h.engine.start().await.unwrap();
    assert_eq!(h.engine.sync_state(), SyncState::AwaitingUser);

    h.set_authorized(Some(author(0xa1)));
    h.engine.start().await.unwrap();

    assert_eq!(h.engine.sync_state(), SyncState::Live);
    assert_eq!(h.provider.call_count("eth_accounts"), 2);
}

#[tokio::test]
async fn start_while_live_refreshes() {
    let h = TestHarness::authorized(author(0xa1));
    h.engine.start().await.unwrap();
    assert!(h.epochs().is_empty());

    h.registry.seed_history(vec![raw_record(2, 1000, "later")]);
    h.engine.start().await.unwrap();

    assert_eq!(h.epochs(), vec![1000]);
    assert_eq!(h.engine.sync_state(), SyncState::Live);
    assert_eq!(h.provider.call_count("eth_accounts"), 1);
}

#[tokio::test]
async fn start_is_coalesced_while_discovering() {
    let h = TestHarness::authorized(author(0xa1));
    let gate = h.provider.gate("eth_accounts");

    let driver = async {
        assert!(h.wait_for_calls("eth_accounts", 1).await);
        assert_eq!(h.engine.sync_state(), SyncState::Discovering);
        h.engine.start().await.unwrap();
        gate.notify_one();
    };
    let (first, ()) = tokio::join!(h.engine.start(), driver);

    first.unwrap();
    assert_eq!(h.provider.call_count("eth_accounts"), 1);
    assert_eq!(h.engine.sync_state(), SyncState::Live);
}

#[tokio::test]
async fn state_changes_are_broadcast_in_order() {
    let h = TestHarness::authorized(author(0xa1));
    let mut rx = h.engine.events();

    h.engine.start().await.unwrap();

    let states: Vec<SyncState> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            EngineEvent::StateChanged(state) => Some(state),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![
            SyncState::Discovering,
            SyncState::Connected,
            SyncState::Syncing,
            SyncState::Live,
        ]
    );
}

#[tokio::test]
async fn account_and_sync_events_are_broadcast() {
    let h = TestHarness::authorized(author(0xa1));
    h.registry.seed_history(vec![raw_record(2, 1000, "a"), raw_record(3, 2000, "b")]);
    let mut rx = h.engine.events();

    h.engine.start().await.unwrap();

    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::AccountChanged(a) if *a == author(0xa1))));
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::Synced { records: 2 })));
}

#[tokio::test]
async fn start_without_wallet_awaits_user() {
    let engine = engine_without_wallet();

    engine.start().await.unwrap();

    assert!(!engine.wallet_available());
    assert_eq!(engine.sync_state(), SyncState::AwaitingUser);
    assert_eq!(engine.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn discovery_failure_is_treated_as_no_account() {
    let h = TestHarness::new();
    h.provider.fail("eth_accounts", 4100, "Unauthorized");

    h.engine.start().await.unwrap();

    assert_eq!(h.engine.sync_state(), SyncState::AwaitingUser);
}

#[tokio::test]
async fn malformed_discovered_account_is_ignored() {
    let h = TestHarness::new();
    h.provider.respond("eth_accounts", json!(["not-an-address"]));

    h.engine.start().await.unwrap();

    assert_eq!(h.engine.account(), None);
    assert_eq!(h.engine.sync_state(), SyncState::AwaitingUser);
}

#[tokio::test]
async fn refresh_before_connect_is_rejected() {
    let h = TestHarness::new();
    let err = h.engine.refresh().await.unwrap_err();
    assert!(matches!(err, SyncError::NotConnected));
    assert_eq!(h.engine.sync_state(), SyncState::Idle);
}
