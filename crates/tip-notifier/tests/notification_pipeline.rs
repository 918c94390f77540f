//! # Notification Pipeline Tests
//!
//! Drives `NotificationLoop` against the in-memory chain state and block
//! store, checking what listeners observe across catch-up, reorgs, storage
//! failures and listener failures.

mod common;

use common::{regtest, tx, Harness, LockProbe, Observed};
use shared_bus::ListenerHandle;
use shared_types::SaplingTree;
use std::sync::Arc;
use std::time::Duration;
use tip_notifier::{
    ChainStateView, LoopState, NotifierConfig, NotifierError, ReplayPhase, TipNotifierApi,
    FATAL_ERROR_MESSAGE,
};

#[test]
fn test_tick_without_cursor_is_noop() {
    let harness = Harness::new();
    harness.extend(1, vec![tx(1)]);
    let mut notifier = harness.notifier(regtest());

    let summary = notifier.tick().unwrap();

    assert_eq!(summary.connected, 0);
    assert!(harness.listener.events().is_empty());
}

#[test]
fn test_linear_catch_up_delivers_in_order() {
    let harness = Harness::new();
    let blocks = harness.extend_many(3);
    let mut notifier = harness.notifier_at(regtest(), &harness.genesis);

    let summary = notifier.tick().unwrap();

    assert_eq!(summary.connected, 3);
    assert_eq!(summary.disconnected, 0);
    assert_eq!(harness.listener.chain_tips(), vec![(1, true), (2, true), (3, true)]);

    // Each block's transactions arrive before its chain-tip event.
    let events = harness.listener.events();
    assert_eq!(
        events[0],
        Observed::Sync {
            txid: tx(1).txid(),
            block: Some(blocks[0].hash),
        }
    );
    assert!(events[1].is_connect());

    assert_eq!(notifier.cursor().height(), Some(3));
    assert_eq!(summary.notified_tip.map(|t| t.height), Some(3));
}

#[test]
fn test_connect_carries_pre_block_trees() {
    let harness = Harness::new();
    let b1 = harness.extend(1, Vec::new());
    let mut notifier = harness.notifier_at(regtest(), &harness.genesis);

    notifier.tick().unwrap();

    match &harness.listener.events()[0] {
        Observed::ChainTip { trees: Some(trees), .. } => {
            assert_eq!(trees.sprout.root(), b1.sprout_anchor);
            // Sapling inactive in the in-memory chain.
            assert_eq!(trees.sapling, SaplingTree::empty());
        }
        other => panic!("expected connect, got {:?}", other),
    }
}

#[test]
fn test_reorg_disconnects_before_connecting() {
    let harness = Harness::new();
    let a1 = harness.extend(1, vec![tx(1)]);
    let a2 = harness.extend(2, vec![tx(2)]);
    let mut notifier = harness.notifier_at(regtest(), &a2);

    // Replace a2 with b2, b3; b2 evicts a mempool transaction.
    let evicted = tx(99);
    {
        let mut state = harness.state.lock();
        state.disconnect_tip();
    }
    let b2 = harness.extend_with_conflicts(12, vec![tx(12)], vec![evicted.clone()]);
    let b3 = harness.extend(13, vec![tx(13)]);

    let summary = notifier.tick().unwrap();

    assert_eq!(summary.disconnected, 1);
    assert_eq!(summary.connected, 2);
    assert_eq!(
        harness.listener.chain_tips(),
        vec![(2, false), (2, true), (3, true)]
    );

    let synced = harness.listener.synced();
    // a2's transaction goes back to unconfirmed.
    assert_eq!(synced[0], (tx(2).txid(), None));
    // Conflicts for b2 come before b2's own transactions.
    assert_eq!(synced[1], (evicted.txid(), None));
    assert_eq!(synced[2].0, tx(12).txid());
    assert!(synced[2].1.is_some());

    assert!(notifier.cursor().get().unwrap().is_same(&b3));
    assert!(!notifier.cursor().get().unwrap().is_same(&a2));
    assert!(b2.prev().unwrap().is_same(&a1));
}

#[test]
fn test_fork_then_return_keeps_cursor_and_advances_sequences() {
    let harness = Harness::new();
    harness.extend(1, Vec::new());
    let a2 = harness.extend(2, Vec::new());
    let mut notifier = harness.notifier_at(regtest(), &a2);

    // Away to b2 and back to a2 within one tick.
    {
        let mut state = harness.state.lock();
        state.disconnect_tip();
    }
    harness.extend(12, Vec::new());
    {
        let mut state = harness.state.lock();
        state.reorg_to(&a2);
        state.add_to_mempool(tx(50));
    }
    let connected_sequence = harness.state.lock().chain_connected_sequence();

    let summary = notifier.tick().unwrap();

    assert_eq!(summary.connected, 0);
    assert_eq!(summary.disconnected, 0);
    assert!(harness.listener.chain_tips().is_empty());
    assert!(notifier.cursor().get().unwrap().is_same(&a2));
    assert_eq!(harness.sequences.chain_notified(), connected_sequence);
    assert_eq!(harness.sequences.mempool_notified(), 1);
    assert_eq!(harness.listener.synced(), vec![(tx(50).txid(), None)]);
}

#[test]
fn test_catch_up_is_bounded_per_tick() {
    let harness = Harness::new();
    harness.extend_many(12);
    let config = NotifierConfig {
        max_catchup_blocks: 5,
        ..regtest()
    };
    let mut notifier = harness.notifier_at(config, &harness.genesis);

    let connected: Vec<_> = (0..3).map(|_| notifier.tick().unwrap().connected).collect();

    assert_eq!(connected, vec![5, 5, 2]);
    assert_eq!(notifier.cursor().height(), Some(12));
    let heights: Vec<_> = harness.listener.chain_tips().iter().map(|t| t.0).collect();
    assert_eq!(heights, (1..=12).collect::<Vec<_>>());
}

#[test]
fn test_missing_block_on_connect_halts_once() {
    let harness = Harness::new();
    let blocks = harness.extend_many(102);
    let cursor = &blocks[99];
    assert_eq!(cursor.height, 100);
    harness.store.remove(&blocks[100].hash);
    let mut notifier = harness.notifier_at(regtest(), cursor);

    let err = notifier.tick().unwrap_err();

    match err {
        NotifierError::FatalStorageInconsistency { height, phase, .. } => {
            assert_eq!(height, 101);
            assert_eq!(phase, ReplayPhase::Connect);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(harness.shutdown.fatal_count(), 1);
    assert_eq!(harness.shutdown.fatal_messages(), vec![FATAL_ERROR_MESSAGE.to_string()]);
    assert!(harness.shutdown.is_shutdown_requested());
    assert!(harness.listener.chain_tips().is_empty());
    assert_eq!(notifier.cursor().height(), Some(100));
}

#[test]
fn test_missing_block_on_disconnect_is_fatal() {
    let harness = Harness::new();
    harness.extend(1, Vec::new());
    let a2 = harness.extend(2, Vec::new());
    let mut notifier = harness.notifier_at(regtest(), &a2);
    harness.store.remove(&a2.hash);
    {
        let mut state = harness.state.lock();
        state.disconnect_tip();
    }
    harness.extend(12, Vec::new());

    let err = notifier.tick().unwrap_err();

    assert!(matches!(
        err,
        NotifierError::FatalStorageInconsistency {
            phase: ReplayPhase::Disconnect,
            ..
        }
    ));
    assert_eq!(harness.shutdown.fatal_count(), 1);
    assert!(harness.listener.events().is_empty());
}

#[test]
fn test_mempool_failures_are_isolated() {
    let harness = Harness::new();
    let mut notifier = harness.notifier_at(regtest(), &harness.genesis);
    {
        let mut state = harness.state.lock();
        state.add_to_mempool(tx(1));
        state.add_to_mempool(tx(2));
        state.add_to_mempool(tx(3));
    }
    harness.listener.fail_sync_for(Some(tx(2).txid()));

    let summary = notifier.tick().unwrap();

    assert_eq!(summary.mempool_failures, 1);
    assert_eq!(summary.mempool_notified, 2);
    assert_eq!(
        harness.listener.synced(),
        vec![(tx(1).txid(), None), (tx(3).txid(), None)]
    );
    assert_eq!(harness.sequences.mempool_notified(), 3);
}

#[test]
fn test_block_listener_failure_propagates_and_resumes() {
    let harness = Harness::new();
    harness.extend_many(3);
    let mut notifier = harness.notifier_at(regtest(), &harness.genesis);
    harness.listener.fail_chain_tip_at(Some(2));

    let err = notifier.tick().unwrap_err();

    assert!(matches!(err, NotifierError::ListenerFailure(_)));
    assert_eq!(notifier.cursor().height(), Some(1));
    assert_eq!(harness.shutdown.fatal_count(), 0);

    // The failed block is planned again on the next tick.
    harness.listener.fail_chain_tip_at(None);
    harness.listener.clear();
    let summary = notifier.tick().unwrap();

    assert_eq!(summary.connected, 2);
    assert_eq!(harness.listener.chain_tips(), vec![(2, true), (3, true)]);
}

#[test]
fn test_undelivered_conflicts_survive_failed_tick() {
    let harness = Harness::new();
    harness.extend(1, vec![tx(1)]);
    let evicted = tx(77);
    harness.extend_with_conflicts(2, vec![tx(2)], vec![evicted.clone()]);
    harness.state.lock().add_to_mempool(tx(60));
    let mut notifier = harness.notifier_at(regtest(), &harness.genesis);
    harness.listener.fail_chain_tip_at(Some(1));

    assert!(notifier.tick().is_err());
    assert!(!harness
        .listener
        .synced()
        .iter()
        .any(|(txid, _)| *txid == evicted.txid()));

    harness.listener.fail_chain_tip_at(None);
    harness.listener.clear();
    let summary = notifier.tick().unwrap();

    assert_eq!(summary.connected, 2);
    assert_eq!(summary.mempool_notified, 1);
    let synced = harness.listener.synced();
    assert!(synced.contains(&(evicted.txid(), None)));
    assert_eq!(synced.last(), Some(&(tx(60).txid(), None)));
    // Recorded with block 1's own sequence, not the current chain sequence.
    assert_eq!(harness.sequences.chain_notified(), 1);
    assert_eq!(harness.state.lock().pending_conflict_records(), 0);
}

#[test]
fn test_deep_reorg_disconnects_in_decreasing_height() {
    let harness = Harness::new();
    let old: Vec<_> = harness.extend_many(4);
    let mut notifier = harness.notifier_at(regtest(), &old[3]);

    {
        let mut state = harness.state.lock();
        for _ in 0..3 {
            state.disconnect_tip();
        }
    }
    let b2 = harness.extend(12, vec![tx(12)]);
    let b3 = harness.extend(13, vec![tx(13)]);

    let summary = notifier.tick().unwrap();

    assert_eq!(summary.disconnected, 3);
    assert_eq!(summary.connected, 2);
    assert_eq!(
        harness.listener.chain_tips(),
        vec![(4, false), (3, false), (2, false), (2, true), (3, true)]
    );

    let tip_hashes: Vec<_> = harness
        .listener
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Observed::ChainTip { hash, .. } => Some(hash),
            Observed::Sync { .. } => None,
        })
        .collect();
    assert_eq!(
        tip_hashes,
        vec![old[3].hash, old[2].hash, old[1].hash, b2.hash, b3.hash]
    );
    assert!(notifier.cursor().get().unwrap().is_same(&b3));
}

#[test]
fn test_mempool_sequence_is_monotonic() {
    let harness = Harness::new();
    let mut notifier = harness.notifier_at(regtest(), &harness.genesis);

    harness.state.lock().add_to_mempool(tx(1));
    harness.state.lock().add_to_mempool(tx(2));
    notifier.tick().unwrap();
    assert_eq!(harness.sequences.mempool_notified(), 2);

    notifier.tick().unwrap();
    assert_eq!(harness.sequences.mempool_notified(), 2);

    harness.state.lock().add_to_mempool(tx(3));
    notifier.tick().unwrap();
    assert_eq!(harness.sequences.mempool_notified(), 3);
}

#[test]
fn test_sequences_not_recorded_outside_regtest() {
    let harness = Harness::new();
    harness.extend(1, Vec::new());
    harness.state.lock().add_to_mempool(tx(1));
    let mut notifier = harness.notifier_at(NotifierConfig::default(), &harness.genesis);

    notifier.tick().unwrap();

    assert_eq!(harness.sequences.chain_notified(), 0);
    assert_eq!(harness.sequences.mempool_notified(), 0);
}

#[test]
fn test_chain_state_lock_is_free_during_dispatch() {
    let harness = Harness::new();
    let probe = LockProbe::new(Arc::clone(&harness.state));
    let handle: ListenerHandle = probe.clone();
    harness.bus.register(handle);
    harness.extend_many(2);
    let a2 = harness.state.lock().tip().unwrap();
    let mut notifier = harness.notifier_at(regtest(), &a2);
    {
        let mut state = harness.state.lock();
        state.disconnect_tip();
    }
    harness.extend(12, Vec::new());

    notifier.tick().unwrap();

    let observed = probe.lock_was_held.lock().clone();
    assert_eq!(observed.len(), 2);
    assert!(observed.iter().all(|held| !held));
}

#[test]
fn test_handle_tracks_progress() {
    let harness = Harness::new();
    let b1 = harness.extend(1, Vec::new());
    let mut notifier = harness.notifier_at(regtest(), &harness.genesis);
    let handle = notifier.handle();

    assert_eq!(handle.state(), LoopState::Ticking);
    notifier.tick().unwrap();

    assert_eq!(handle.ticks_completed(), 1);
    assert_eq!(handle.last_notified().map(|t| t.hash), Some(b1.hash));
}

#[tokio::test(start_paused = true)]
async fn test_run_waits_for_genesis_then_ticks_until_shutdown() {
    let harness = Harness::without_genesis();
    let notifier = harness.notifier(regtest());
    let handle = notifier.handle();
    let task = tokio::spawn(notifier.run(harness.shutdown.subscribe()));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(handle.state(), LoopState::WaitingForGenesis);

    harness.state.lock().load_genesis(harness.genesis.clone());
    harness.extend(1, vec![tx(1)]);
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert_eq!(harness.listener.chain_tips(), vec![(1, true)]);
    assert_eq!(handle.last_notified().map(|t| t.height), Some(1));

    harness.shutdown.request_shutdown();
    let result = task.await.unwrap();

    assert!(result.is_ok());
    assert_eq!(handle.state(), LoopState::Terminated);
}

#[tokio::test(start_paused = true)]
async fn test_run_returns_fatal_error() {
    let harness = Harness::new();
    let b1 = harness.extend(1, Vec::new());
    harness.store.remove(&b1.hash);
    let notifier = harness.notifier_at(regtest(), &harness.genesis);
    let handle = notifier.handle();

    let result = notifier.run(harness.shutdown.subscribe()).await;

    assert!(matches!(
        result,
        Err(NotifierError::FatalStorageInconsistency { height: 1, .. })
    ));
    assert_eq!(handle.state(), LoopState::Terminated);
    assert_eq!(harness.shutdown.fatal_count(), 1);
}
