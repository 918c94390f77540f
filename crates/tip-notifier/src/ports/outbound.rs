//! Driven Ports (SPI - Outbound Dependencies)
//!
//! `ChainStateView` and `MempoolView` are only ever reached through the
//! chain-state lock (`SharedNodeState`); the other ports are lock-free.

use parking_lot::Mutex;
use shared_types::{
    last_common_ancestor, Block, BlockHeight, ChainIndexRef, Hash, NetworkUpgrade, SaplingTree,
    SequenceNumber, SproutTree, StorageError, Transaction,
};
use std::sync::Arc;

/// Read surface over the best-chain index and commitment-tree store.
pub trait ChainStateView {
    /// Current best tip, `None` before the genesis block is loaded.
    fn tip(&self) -> Option<ChainIndexRef>;

    /// Genesis block of the active chain, once loaded.
    fn genesis(&self) -> Option<ChainIndexRef>;

    /// Most recent block shared by `a` and `b`.
    ///
    /// # Panics
    ///
    /// If the two blocks descend from different genesis blocks; the index
    /// is inconsistent at that point.
    fn find_common_ancestor(&self, a: &ChainIndexRef, b: &ChainIndexRef) -> ChainIndexRef {
        match last_common_ancestor(a, b) {
            Some(fork) => fork,
            None => panic!(
                "blocks at heights {} and {} share no common ancestor",
                a.height, b.height
            ),
        }
    }

    /// Sprout tree whose root is `anchor`.
    fn sprout_tree_at(&self, anchor: &Hash) -> Option<SproutTree>;

    /// Sapling tree whose root is `root`.
    fn sapling_tree_at(&self, root: &Hash) -> Option<SaplingTree>;

    fn is_upgrade_active_at(&self, upgrade: NetworkUpgrade, height: BlockHeight) -> bool;

    /// Sequence number of the most recent block connection.
    fn chain_connected_sequence(&self) -> SequenceNumber;
}

/// Query/drain surface over pending transactions.
pub trait MempoolView {
    /// Transactions added since the last drain, with the mempool sequence
    /// they bring listeners up to.
    fn drain_recently_added(&mut self) -> (Vec<Transaction>, SequenceNumber);

    /// Mempool transactions evicted as conflicts when `block` was connected,
    /// with the chain sequence of that connection.
    fn take_recently_conflicted(
        &mut self,
        block: &ChainIndexRef,
    ) -> (Vec<Transaction>, SequenceNumber);

    /// Put back a conflict record taken for a block that was never
    /// delivered. Records for blocks no longer on the active chain are
    /// dropped.
    fn restore_recently_conflicted(
        &mut self,
        block: &ChainIndexRef,
        conflicted: Vec<Transaction>,
        sequence: SequenceNumber,
    );

    /// Put back drained transactions that were never delivered, ahead of
    /// anything added since the drain.
    fn restore_recently_added(&mut self, transactions: Vec<Transaction>);
}

/// Everything reachable under the chain-state lock.
pub trait NodeState: ChainStateView + MempoolView + Send {}

impl<T> NodeState for T where T: ChainStateView + MempoolView + Send {}

/// The chain-state lock and the state behind it.
pub type SharedNodeState<S> = Arc<Mutex<S>>;

/// Block body storage. Read without the chain-state lock.
pub trait BlockStore: Send + Sync {
    fn read_block(&self, index: &ChainIndexRef) -> Result<Block, StorageError>;
}

/// Process control exposed to the loop.
pub trait ProcessControl: Send + Sync {
    /// Surface `user_message` and begin shutting the process down.
    fn request_fatal_shutdown(&self, user_message: &str);
}

/// Sink for notified sequence numbers in deterministic (regtest) mode.
///
/// Called after dispatch without the chain-state lock, so implementations
/// must be lock-free with respect to it.
pub trait NotifiedSequences: Send + Sync {
    fn set_chain_notified(&self, sequence: SequenceNumber);

    fn set_mempool_notified(&self, sequence: SequenceNumber);
}
