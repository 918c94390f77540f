//! Shared fixtures for tip-notifier integration tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use shared_bus::{ListenerHandle, SignalBus, ValidationListener};
use shared_types::{
    Block, BlockHeight, BlockIndexEntry, ChainIndexRef, CommitmentTrees, Hash, ListenerError,
    ListenerResult, SaplingTree, Transaction, TxId,
};
use std::sync::Arc;
use tip_notifier::{
    AtomicNotifiedSequences, InMemoryBlockStore, InMemoryChainState, NotificationLoop,
    NotifierConfig, SharedNodeState, ShutdownController,
};

/// One observed listener callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    Sync {
        txid: TxId,
        block: Option<Hash>,
    },
    ChainTip {
        height: BlockHeight,
        hash: Hash,
        trees: Option<CommitmentTrees>,
    },
}

impl Observed {
    pub fn is_connect(&self) -> bool {
        matches!(self, Observed::ChainTip { trees: Some(_), .. })
    }

    pub fn is_disconnect(&self) -> bool {
        matches!(self, Observed::ChainTip { trees: None, .. })
    }
}

/// Records every callback; can be told to fail on a given transaction or
/// chain-tip height.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<Observed>>,
    fail_sync_for: Mutex<Option<TxId>>,
    fail_chain_tip_at: Mutex<Option<BlockHeight>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Observed> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn fail_sync_for(&self, txid: Option<TxId>) {
        *self.fail_sync_for.lock() = txid;
    }

    pub fn fail_chain_tip_at(&self, height: Option<BlockHeight>) {
        *self.fail_chain_tip_at.lock() = height;
    }

    /// (height, connected) for every chain-tip callback, in order.
    pub fn chain_tips(&self) -> Vec<(BlockHeight, bool)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Observed::ChainTip { height, trees, .. } => Some((*height, trees.is_some())),
                Observed::Sync { .. } => None,
            })
            .collect()
    }

    pub fn synced(&self) -> Vec<(TxId, Option<Hash>)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Observed::Sync { txid, block } => Some((*txid, *block)),
                Observed::ChainTip { .. } => None,
            })
            .collect()
    }
}

impl ValidationListener for RecordingListener {
    fn name(&self) -> &str {
        "recording"
    }

    fn sync_transaction(&self, tx: &Transaction, block: Option<&Block>) -> ListenerResult {
        if *self.fail_sync_for.lock() == Some(tx.txid()) {
            return Err(ListenerError::failed("recording", "rejected transaction"));
        }
        self.events.lock().push(Observed::Sync {
            txid: tx.txid(),
            block: block.map(Block::hash),
        });
        Ok(())
    }

    fn chain_tip(
        &self,
        index: &ChainIndexRef,
        _block: &Block,
        old_trees: Option<&CommitmentTrees>,
    ) -> ListenerResult {
        if *self.fail_chain_tip_at.lock() == Some(index.height) {
            return Err(ListenerError::failed("recording", "chain tip rejected"));
        }
        self.events.lock().push(Observed::ChainTip {
            height: index.height,
            hash: index.hash,
            trees: old_trees.copied(),
        });
        Ok(())
    }
}

/// Checks the chain-state lock is free whenever a block event arrives.
pub struct LockProbe {
    state: SharedNodeState<InMemoryChainState>,
    pub lock_was_held: Mutex<Vec<bool>>,
}

impl LockProbe {
    pub fn new(state: SharedNodeState<InMemoryChainState>) -> Arc<Self> {
        Arc::new(Self {
            state,
            lock_was_held: Mutex::new(Vec::new()),
        })
    }
}

impl ValidationListener for LockProbe {
    fn name(&self) -> &str {
        "lock-probe"
    }

    fn chain_tip(
        &self,
        _index: &ChainIndexRef,
        _block: &Block,
        _old_trees: Option<&CommitmentTrees>,
    ) -> ListenerResult {
        let held = self.state.try_lock().is_none();
        self.lock_was_held.lock().push(held);
        Ok(())
    }
}

pub fn tx(tag: u8) -> Transaction {
    Transaction::from_raw(vec![0xF0, tag, tag])
}

/// Chain state, block store, bus and collaborators wired together, with the
/// genesis block loaded and stored.
pub struct Harness {
    pub state: SharedNodeState<InMemoryChainState>,
    pub store: Arc<InMemoryBlockStore>,
    pub bus: Arc<SignalBus>,
    pub shutdown: Arc<ShutdownController>,
    pub sequences: Arc<AtomicNotifiedSequences>,
    pub listener: Arc<RecordingListener>,
    pub genesis: ChainIndexRef,
}

impl Harness {
    pub fn new() -> Self {
        let harness = Self::without_genesis();
        let genesis = harness.genesis.clone();
        harness.state.lock().load_genesis(genesis);
        harness
    }

    /// Everything wired, genesis built and stored but not loaded.
    pub fn without_genesis() -> Self {
        let state = Arc::new(Mutex::new(InMemoryChainState::new()));
        let store = Arc::new(InMemoryBlockStore::new());
        let bus = Arc::new(SignalBus::new());
        let listener = RecordingListener::new();
        let handle: ListenerHandle = listener.clone();
        bus.register(handle);

        let body = Block::new([0; 32], SaplingTree::EMPTY_ROOT, 0, vec![tx(0)]);
        let genesis = BlockIndexEntry::genesis(body.hash(), [0; 32], SaplingTree::EMPTY_ROOT, 0);
        store.insert(genesis.hash, body);

        Self {
            state,
            store,
            bus,
            shutdown: Arc::new(ShutdownController::new()),
            sequences: Arc::new(AtomicNotifiedSequences::new()),
            listener,
            genesis,
        }
    }

    pub fn notifier(
        &self,
        config: NotifierConfig,
    ) -> NotificationLoop<InMemoryChainState, InMemoryBlockStore> {
        NotificationLoop::new(
            config,
            Arc::clone(&self.state),
            Arc::clone(&self.store),
            Arc::clone(&self.bus),
            self.shutdown.clone(),
            self.sequences.clone(),
        )
    }

    /// Notifier whose cursor starts at `tip`.
    pub fn notifier_at(
        &self,
        config: NotifierConfig,
        tip: &ChainIndexRef,
    ) -> NotificationLoop<InMemoryChainState, InMemoryBlockStore> {
        self.notifier(config).with_last_tip(Arc::clone(tip))
    }

    /// Build and store a block on `parent` without connecting it.
    pub fn make_block(
        &self,
        parent: &ChainIndexRef,
        tag: u8,
        txs: Vec<Transaction>,
    ) -> ChainIndexRef {
        let time = parent.time + 1;
        let body = Block::new(parent.hash, [tag; 32], time, txs);
        let index = BlockIndexEntry::child(parent, body.hash(), [tag; 32], [tag; 32], time);
        self.store.insert(index.hash, body);
        index
    }

    /// Build, store and connect a block on the current tip.
    pub fn extend(&self, tag: u8, txs: Vec<Transaction>) -> ChainIndexRef {
        self.extend_with_conflicts(tag, txs, Vec::new())
    }

    pub fn extend_with_conflicts(
        &self,
        tag: u8,
        txs: Vec<Transaction>,
        conflicted: Vec<Transaction>,
    ) -> ChainIndexRef {
        let mut state = self.state.lock();
        let parent = tip_of(&state);
        let block = self.make_block(&parent, tag, txs);
        state.connect_tip(Arc::clone(&block), conflicted);
        block
    }

    /// Extend the chain by `count` blocks, one transaction each.
    pub fn extend_many(&self, count: u8) -> Vec<ChainIndexRef> {
        (1..=count).map(|tag| self.extend(tag, vec![tx(tag)])).collect()
    }
}

fn tip_of(state: &InMemoryChainState) -> ChainIndexRef {
    use tip_notifier::ChainStateView;
    match state.tip() {
        Some(tip) => tip,
        None => panic!("harness chain has no tip"),
    }
}

pub fn regtest() -> NotifierConfig {
    NotifierConfig::for_network(tip_notifier::Network::Regtest)
}
