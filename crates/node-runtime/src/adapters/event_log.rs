//! JSON event log listener.
//!
//! One `EVENT_FLOW_JSON` line per chain-tip event, in the same shape the
//! rest of the node logs event flow.

use serde_json::{json, Value};
use shared_bus::ValidationListener;
use shared_types::{Block, ChainIndexRef, CommitmentTrees, ListenerResult, Transaction};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

pub struct EventLogListener {
    logged: AtomicU64,
}

impl EventLogListener {
    pub fn new() -> Self {
        Self {
            logged: AtomicU64::new(0),
        }
    }

    /// Chain-tip events logged so far.
    pub fn logged(&self) -> u64 {
        self.logged.load(Ordering::Relaxed)
    }

    /// The JSON record for one chain-tip event.
    pub fn chain_tip_record(
        index: &ChainIndexRef,
        block: &Block,
        old_trees: Option<&CommitmentTrees>,
    ) -> Value {
        let event_type = if old_trees.is_some() {
            "BlockConnected"
        } else {
            "BlockDisconnected"
        };
        let mut metadata = json!({
            "tx_count": block.transactions.len(),
            "block_time": index.time,
        });
        if let Some(trees) = old_trees {
            metadata["sprout_root"] = json!(hex::encode(trees.sprout.root()));
            metadata["sapling_root"] = json!(hex::encode(trees.sapling.root()));
        }

        json!({
            "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
            "subsystem_id": "tip-notifier",
            "event_type": event_type,
            "correlation_id": format!("{:x}", index.hash[0]),
            "block_hash": hex::encode(index.hash),
            "block_height": index.height,
            "metadata": metadata,
        })
    }
}

impl Default for EventLogListener {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationListener for EventLogListener {
    fn name(&self) -> &str {
        "event-log"
    }

    fn sync_transaction(&self, tx: &Transaction, block: Option<&Block>) -> ListenerResult {
        debug!(
            "[node] Transaction {} synced ({})",
            hex::encode(tx.txid()),
            if block.is_some() { "confirmed" } else { "unconfirmed" }
        );
        Ok(())
    }

    fn chain_tip(
        &self,
        index: &ChainIndexRef,
        block: &Block,
        old_trees: Option<&CommitmentTrees>,
    ) -> ListenerResult {
        info!(
            "EVENT_FLOW_JSON {}",
            Self::chain_tip_record(index, block, old_trees)
        );
        self.logged.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
