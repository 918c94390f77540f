//! # Validation Listener
//!
//! The capability set every registered listener implements. All methods
//! default to no-ops so a listener only overrides the events it consumes.

use shared_types::{
    Block, ChainIndexRef, CommitmentTrees, Hash, ListenerResult, MiningScript, Transaction, TxId,
    ValidationState,
};

/// A consumer of chain and mempool events (wallets, fee estimators, RPC).
///
/// Listeners are invoked synchronously on the dispatching task and must not
/// assume any lock is held.
pub trait ValidationListener: Send + Sync {
    /// Name used in logs when this listener fails.
    fn name(&self) -> &str {
        "listener"
    }

    /// The validation engine moved the best tip.
    fn updated_block_tip(&self, _tip: &ChainIndexRef) -> ListenerResult {
        Ok(())
    }

    /// `tx` is now confirmed in `block`, or unconfirmed when `block` is `None`
    /// (mempool, disconnected, or conflicted).
    fn sync_transaction(&self, _tx: &Transaction, _block: Option<&Block>) -> ListenerResult {
        Ok(())
    }

    fn erase_transaction(&self, _txid: &TxId) -> ListenerResult {
        Ok(())
    }

    fn updated_transaction(&self, _txid: &TxId) -> ListenerResult {
        Ok(())
    }

    /// `block` was connected (`old_trees` holds the commitment trees as of its
    /// start) or disconnected (`old_trees` is `None`).
    fn chain_tip(
        &self,
        _index: &ChainIndexRef,
        _block: &Block,
        _old_trees: Option<&CommitmentTrees>,
    ) -> ListenerResult {
        Ok(())
    }

    fn inventory(&self, _hash: &Hash) -> ListenerResult {
        Ok(())
    }

    /// Rebroadcast pending transactions older than `best_block_time`.
    fn resend_transactions(&self, _best_block_time: i64) -> ListenerResult {
        Ok(())
    }

    fn block_checked(&self, _block: &Block, _state: &ValidationState) -> ListenerResult {
        Ok(())
    }

    /// Supply a coinbase script; listeners leave `script` alone if they have none.
    fn script_for_mining(&self, _script: &mut Option<MiningScript>) -> ListenerResult {
        Ok(())
    }

    /// The local miner found the block `hash`.
    fn block_found(&self, _hash: &Hash) -> ListenerResult {
        Ok(())
    }
}
