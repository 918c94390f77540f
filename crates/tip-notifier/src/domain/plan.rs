//! Replay plan
//!
//! Owned snapshot of everything one tick delivers. Built under the
//! chain-state lock; consumed after it is released.

use shared_types::{BlockHeight, ChainIndexRef, CommitmentTrees, SequenceNumber, Transaction};

/// One block to notify as connected.
#[derive(Debug, Clone)]
pub struct ReplayEntry {
    pub block: ChainIndexRef,
    /// Commitment trees as of the start of `block`.
    pub trees: CommitmentTrees,
    /// Mempool transactions evicted by `block`, in eviction order.
    pub conflicted: Vec<Transaction>,
    /// Chain sequence of the connection that evicted `conflicted`.
    pub sequence: SequenceNumber,
}

/// Mempool transactions added since the last drain.
#[derive(Debug, Clone, Default)]
pub struct MempoolAdditions {
    pub transactions: Vec<Transaction>,
    /// Mempool sequence to record once these are delivered; 0 if nothing was drained.
    pub sequence: SequenceNumber,
}

/// The work for one tick.
///
/// Invariants (by construction):
/// - `fork_point` is an ancestor of both the old cursor and the best tip.
/// - `disconnects` runs from the old cursor down to `fork_point`
///   (exclusive), strictly decreasing in height.
/// - `connect_stack` is pushed tip-first, so popping yields strictly
///   increasing heights starting just above `fork_point`.
#[derive(Debug, Clone)]
pub struct ReplayPlan {
    pub fork_point: ChainIndexRef,
    pub disconnects: Vec<ChainIndexRef>,
    pub connect_stack: Vec<ReplayEntry>,
    /// Chain sequence listeners are caught up to once this plan is delivered.
    pub chain_notified_sequence: Option<SequenceNumber>,
    pub mempool_additions: MempoolAdditions,
}

impl ReplayPlan {
    /// A plan with nothing to deliver, anchored at `cursor`.
    pub fn idle(cursor: &ChainIndexRef) -> Self {
        Self {
            fork_point: ChainIndexRef::clone(cursor),
            disconnects: Vec::new(),
            connect_stack: Vec::new(),
            chain_notified_sequence: None,
            mempool_additions: MempoolAdditions::default(),
        }
    }

    /// Next block to connect, lowest height first.
    pub fn next_connect(&mut self) -> Option<ReplayEntry> {
        self.connect_stack.pop()
    }

    pub fn connect_count(&self) -> usize {
        self.connect_stack.len()
    }

    /// Height the cursor reaches once every connect is delivered.
    pub fn connect_target_height(&self) -> Option<BlockHeight> {
        self.connect_stack.first().map(|e| e.block.height)
    }

    pub fn is_empty(&self) -> bool {
        self.disconnects.is_empty()
            && self.connect_stack.is_empty()
            && self.mempool_additions.transactions.is_empty()
    }
}
