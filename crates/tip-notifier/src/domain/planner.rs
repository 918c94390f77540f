//! Replay planner
//!
//! Runs once per tick with the chain-state lock held. Everything the tick
//! will deliver is copied out into an owned [`ReplayPlan`], so dispatch
//! can proceed after the lock is dropped.

use super::plan::{MempoolAdditions, ReplayEntry, ReplayPlan};
use crate::config::DEFAULT_MAX_CATCHUP_BLOCKS;
use crate::ports::outbound::NodeState;
use shared_types::{hash_hex, ChainIndexRef, CommitmentTrees, NetworkUpgrade, SaplingTree};
use std::sync::Arc;
use tracing::debug;

/// Computes the fork point and bounded catch-up window for one tick.
#[derive(Debug, Clone, Copy)]
pub struct ReplayPlanner {
    max_catchup_blocks: u64,
}

impl ReplayPlanner {
    pub fn new(max_catchup_blocks: u64) -> Self {
        Self { max_catchup_blocks }
    }

    pub fn max_catchup_blocks(&self) -> u64 {
        self.max_catchup_blocks
    }

    /// Snapshot the work between `cursor` and the current best tip.
    ///
    /// Consumes the conflicted-transaction record of every block placed on
    /// the connect stack, and drains the mempool's recently-added set when
    /// the chain side reached a notified sequence.
    ///
    /// # Panics
    ///
    /// If a block on the active chain lacks its Sprout or Sapling tree, or
    /// `cursor` and the tip share no ancestor. Both mean the chain state
    /// is inconsistent.
    pub fn plan<S: NodeState + ?Sized>(
        &self,
        state: &mut S,
        cursor: &ChainIndexRef,
    ) -> ReplayPlan {
        let Some(tip) = state.tip() else {
            return ReplayPlan::idle(cursor);
        };

        let fork_point = state.find_common_ancestor(cursor, &tip);
        let disconnects = disconnect_path(cursor, &fork_point);

        let window_top = fork_point.height.saturating_add(self.max_catchup_blocks);
        let mut next = if tip.height > window_top {
            tip.ancestor(window_top)
        } else {
            Some(Arc::clone(&tip))
        };

        let original_tip_at_fork = next.as_ref().is_some_and(|b| b.is_same(&fork_point));

        let mut connect_stack = Vec::new();
        let mut chain_notified_sequence = None;
        while let Some(block) = next.take() {
            if block.is_same(&fork_point) {
                break;
            }
            let trees = trees_before(state, &block);
            let (conflicted, sequence) = state.take_recently_conflicted(&block);
            chain_notified_sequence = Some(sequence);
            next = block.prev().cloned();
            connect_stack.push(ReplayEntry {
                block,
                trees,
                conflicted,
                sequence,
            });
        }

        if original_tip_at_fork {
            chain_notified_sequence = Some(state.chain_connected_sequence());
        }

        let mempool_additions = if chain_notified_sequence.is_some() {
            let (transactions, sequence) = state.drain_recently_added();
            MempoolAdditions {
                transactions,
                sequence,
            }
        } else {
            MempoolAdditions::default()
        };

        debug!(
            "[tip-notifier] Planned tick: fork={} disconnects={} connects={} mempool={}",
            fork_point.height,
            disconnects.len(),
            connect_stack.len(),
            mempool_additions.transactions.len()
        );

        ReplayPlan {
            fork_point,
            disconnects,
            connect_stack,
            chain_notified_sequence,
            mempool_additions,
        }
    }
}

impl Default for ReplayPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CATCHUP_BLOCKS)
    }
}

/// Blocks from `cursor` down to `fork` (exclusive), highest first.
fn disconnect_path(cursor: &ChainIndexRef, fork: &ChainIndexRef) -> Vec<ChainIndexRef> {
    let mut path = Vec::new();
    let mut current = Some(Arc::clone(cursor));
    while let Some(block) = current {
        if block.is_same(fork) {
            break;
        }
        current = block.prev().cloned();
        path.push(block);
    }
    path
}

/// Commitment trees as of the start of `block`.
fn trees_before<S: NodeState + ?Sized>(state: &S, block: &ChainIndexRef) -> CommitmentTrees {
    let sprout = match state.sprout_tree_at(&block.sprout_anchor) {
        Some(tree) => tree,
        None => panic!(
            "missing Sprout tree {} for active-chain block at height {}",
            hash_hex(&block.sprout_anchor),
            block.height
        ),
    };

    let Some(prev) = block.prev() else {
        panic!("block at height {} above the fork point has no parent", block.height);
    };
    let sapling_root = if state.is_upgrade_active_at(NetworkUpgrade::Sapling, prev.height) {
        prev.final_sapling_root
    } else {
        SaplingTree::EMPTY_ROOT
    };
    let sapling = match state.sapling_tree_at(&sapling_root) {
        Some(tree) => tree,
        None => panic!(
            "missing Sapling tree {} for active-chain block at height {}",
            hash_hex(&sapling_root),
            block.height
        ),
    };

    CommitmentTrees { sprout, sapling }
}
