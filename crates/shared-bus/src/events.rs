//! # Event Kinds
//!
//! The ten event kinds a listener may be registered for.

use std::fmt;

/// Every event the bus can dispatch.
///
/// Each kind maps to one method of [`crate::ValidationListener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The best chain tip changed (validation side).
    UpdatedBlockTip,
    /// A transaction entered, left, or was confirmed in the best chain.
    SyncTransaction,
    /// A transaction should be forgotten.
    EraseTransaction,
    /// A known transaction changed.
    UpdatedTransaction,
    /// A block was connected or disconnected by the notification loop.
    ChainTip,
    /// An inventory item was seen.
    Inventory,
    /// Listeners should rebroadcast their pending transactions.
    Broadcast,
    /// Block validation finished.
    BlockChecked,
    /// The miner asks for a coinbase output script.
    ScriptForMining,
    /// A block was found by the local miner.
    BlockFound,
}

impl EventKind {
    /// Number of event kinds.
    pub const COUNT: usize = 10;

    /// All kinds, in registration order.
    pub const ALL: [EventKind; Self::COUNT] = [
        EventKind::UpdatedBlockTip,
        EventKind::SyncTransaction,
        EventKind::EraseTransaction,
        EventKind::UpdatedTransaction,
        EventKind::ChainTip,
        EventKind::Inventory,
        EventKind::Broadcast,
        EventKind::BlockChecked,
        EventKind::ScriptForMining,
        EventKind::BlockFound,
    ];

    /// Slot of this kind in per-kind tables.
    pub const fn index(self) -> usize {
        match self {
            EventKind::UpdatedBlockTip => 0,
            EventKind::SyncTransaction => 1,
            EventKind::EraseTransaction => 2,
            EventKind::UpdatedTransaction => 3,
            EventKind::ChainTip => 4,
            EventKind::Inventory => 5,
            EventKind::Broadcast => 6,
            EventKind::BlockChecked => 7,
            EventKind::ScriptForMining => 8,
            EventKind::BlockFound => 9,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            EventKind::UpdatedBlockTip => "updated_block_tip",
            EventKind::SyncTransaction => "sync_transaction",
            EventKind::EraseTransaction => "erase_transaction",
            EventKind::UpdatedTransaction => "updated_transaction",
            EventKind::ChainTip => "chain_tip",
            EventKind::Inventory => "inventory",
            EventKind::Broadcast => "broadcast",
            EventKind::BlockChecked => "block_checked",
            EventKind::ScriptForMining => "script_for_mining",
            EventKind::BlockFound => "block_found",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
