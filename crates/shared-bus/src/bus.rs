//! # Signal Bus
//!
//! Listener registry and synchronous dispatch.

use crate::events::EventKind;
use crate::listener::ValidationListener;
use parking_lot::RwLock;
use shared_types::{
    Block, ChainIndexRef, CommitmentTrees, Hash, ListenerResult, MiningScript, Transaction, TxId,
    ValidationState,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Shared handle to a registered listener. Identity is the allocation.
pub type ListenerHandle = Arc<dyn ValidationListener>;

fn same_listener(a: &ListenerHandle, b: &ListenerHandle) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Registry of listeners per event kind.
///
/// Owned explicitly and shared through `Arc`; every listener must be removed
/// (individually or with [`SignalBus::unregister_all`]) before teardown.
pub struct SignalBus {
    /// Insertion-ordered listeners, indexed by `EventKind::index`.
    slots: RwLock<[Vec<ListenerHandle>; EventKind::COUNT]>,

    /// Total dispatches started.
    dispatched: AtomicU64,
}

impl SignalBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(std::array::from_fn(|_| Vec::new())),
            dispatched: AtomicU64::new(0),
        }
    }

    /// Register `listener` for every event kind.
    ///
    /// Returns `true` if it was newly added to at least one kind.
    pub fn register(&self, listener: ListenerHandle) -> bool {
        self.register_for(listener, &EventKind::ALL)
    }

    /// Register `listener` for the given kinds only. Kinds it is already
    /// registered for are left untouched.
    pub fn register_for(&self, listener: ListenerHandle, kinds: &[EventKind]) -> bool {
        let mut slots = self.slots.write();
        let mut added = false;
        for kind in kinds {
            let slot = &mut slots[kind.index()];
            if !slot.iter().any(|l| same_listener(l, &listener)) {
                slot.push(Arc::clone(&listener));
                added = true;
            }
        }
        debug!(listener = listener.name(), added, "[signal-bus] Listener registered");
        added
    }

    /// Remove `listener` from every kind. Unknown listeners are a no-op.
    ///
    /// Returns `true` if anything was removed.
    pub fn unregister(&self, listener: &ListenerHandle) -> bool {
        let mut slots = self.slots.write();
        let mut removed = false;
        for slot in slots.iter_mut() {
            let before = slot.len();
            slot.retain(|l| !same_listener(l, listener));
            removed |= slot.len() != before;
        }
        if removed {
            debug!(listener = listener.name(), "[signal-bus] Listener unregistered");
        }
        removed
    }

    /// Drop every registration.
    pub fn unregister_all(&self) {
        let mut slots = self.slots.write();
        for slot in slots.iter_mut() {
            slot.clear();
        }
        debug!("[signal-bus] All listeners unregistered");
    }

    /// Number of listeners currently registered for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.slots.read()[kind.index()].len()
    }

    /// Total dispatches started since creation.
    #[must_use]
    pub fn dispatch_count(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    fn snapshot(&self, kind: EventKind) -> Vec<ListenerHandle> {
        self.slots.read()[kind.index()].clone()
    }

    /// Invoke `deliver` on every listener registered for `kind`, in
    /// registration order. The registry lock is not held while listeners run.
    ///
    /// The first listener error aborts the dispatch and is returned.
    pub fn dispatch<F>(&self, kind: EventKind, mut deliver: F) -> ListenerResult
    where
        F: FnMut(&dyn ValidationListener) -> ListenerResult,
    {
        let listeners = self.snapshot(kind);
        self.dispatched.fetch_add(1, Ordering::Relaxed);

        for listener in &listeners {
            if let Err(e) = deliver(listener.as_ref()) {
                debug!(
                    kind = %kind,
                    listener = listener.name(),
                    error = %e,
                    "[signal-bus] Listener failed"
                );
                return Err(e);
            }
        }
        Ok(())
    }

    // =========================================================================
    // TYPED DISPATCH
    // =========================================================================

    pub fn updated_block_tip(&self, tip: &ChainIndexRef) -> ListenerResult {
        self.dispatch(EventKind::UpdatedBlockTip, |l| l.updated_block_tip(tip))
    }

    pub fn sync_transaction(&self, tx: &Transaction, block: Option<&Block>) -> ListenerResult {
        self.dispatch(EventKind::SyncTransaction, |l| l.sync_transaction(tx, block))
    }

    pub fn erase_transaction(&self, txid: &TxId) -> ListenerResult {
        self.dispatch(EventKind::EraseTransaction, |l| l.erase_transaction(txid))
    }

    pub fn updated_transaction(&self, txid: &TxId) -> ListenerResult {
        self.dispatch(EventKind::UpdatedTransaction, |l| l.updated_transaction(txid))
    }

    pub fn chain_tip(
        &self,
        index: &ChainIndexRef,
        block: &Block,
        old_trees: Option<&CommitmentTrees>,
    ) -> ListenerResult {
        self.dispatch(EventKind::ChainTip, |l| l.chain_tip(index, block, old_trees))
    }

    pub fn inventory(&self, hash: &Hash) -> ListenerResult {
        self.dispatch(EventKind::Inventory, |l| l.inventory(hash))
    }

    pub fn broadcast(&self, best_block_time: i64) -> ListenerResult {
        self.dispatch(EventKind::Broadcast, |l| l.resend_transactions(best_block_time))
    }

    pub fn block_checked(&self, block: &Block, state: &ValidationState) -> ListenerResult {
        self.dispatch(EventKind::BlockChecked, |l| l.block_checked(block, state))
    }

    /// Ask listeners for a coinbase script. Later listeners see (and may
    /// replace) what earlier ones supplied.
    pub fn script_for_mining(&self) -> Result<Option<MiningScript>, shared_types::ListenerError> {
        let mut script = None;
        self.dispatch(EventKind::ScriptForMining, |l| l.script_for_mining(&mut script))?;
        Ok(script)
    }

    pub fn block_found(&self, hash: &Hash) -> ListenerResult {
        self.dispatch(EventKind::BlockFound, |l| l.block_found(hash))
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}
