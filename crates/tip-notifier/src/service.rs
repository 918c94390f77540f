//! Notification loop
//!
//! Background driver that replays best-chain and mempool changes to the
//! signal bus once per tick. The chain-state lock is held only while the
//! [`ReplayPlanner`] builds the tick's plan; every dispatch happens after it
//! is released.

use crate::config::NotifierConfig;
use crate::domain::{
    LoopState, MempoolAdditions, NotificationCursor, NotifiedTip, NotifierHandle, ReplayEntry,
    ReplayPlan, ReplayPlanner,
};
use crate::error::{NotifierError, NotifierResult, ReplayPhase, FATAL_ERROR_MESSAGE};
use crate::metrics;
use crate::ports::outbound::{
    BlockStore, NodeState, NotifiedSequences, ProcessControl, SharedNodeState,
};
use shared_bus::SignalBus;
use shared_types::{hash_hex, Block, ChainIndexRef, StorageError};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// What one tick delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub disconnected: usize,
    pub connected: usize,
    pub mempool_notified: usize,
    /// Mempool dispatches that failed and were skipped.
    pub mempool_failures: usize,
    pub notified_tip: Option<NotifiedTip>,
}

/// The chain-tip notification loop.
pub struct NotificationLoop<S: NodeState, B: BlockStore> {
    config: NotifierConfig,
    planner: ReplayPlanner,
    state: SharedNodeState<S>,
    blocks: Arc<B>,
    bus: Arc<SignalBus>,
    process: Arc<dyn ProcessControl>,
    sequences: Arc<dyn NotifiedSequences>,
    cursor: NotificationCursor,
    handle: NotifierHandle,
}

impl<S: NodeState, B: BlockStore> NotificationLoop<S, B> {
    pub fn new(
        config: NotifierConfig,
        state: SharedNodeState<S>,
        blocks: Arc<B>,
        bus: Arc<SignalBus>,
        process: Arc<dyn ProcessControl>,
        sequences: Arc<dyn NotifiedSequences>,
    ) -> Self {
        let planner = ReplayPlanner::new(config.max_catchup_blocks);
        Self {
            config,
            planner,
            state,
            blocks,
            bus,
            process,
            sequences,
            cursor: NotificationCursor::unset(),
            handle: NotifierHandle::new(None),
        }
    }

    /// Resume from a block listeners already know about instead of genesis.
    pub fn with_last_tip(mut self, tip: ChainIndexRef) -> Self {
        self.handle = NotifierHandle::new(Some(NotifiedTip::from(&tip)));
        self.cursor = NotificationCursor::at(tip);
        self
    }

    /// Read handle onto the loop's progress; stays valid after `run` returns.
    pub fn handle(&self) -> NotifierHandle {
        self.handle.clone()
    }

    pub fn cursor(&self) -> &NotificationCursor {
        &self.cursor
    }

    /// Run until shutdown is signalled or a tick fails.
    ///
    /// Shutdown during a sleep ends the loop with `Ok(())`. A fatal storage
    /// inconsistency or a block-level listener failure is returned.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> NotifierResult<()> {
        info!(
            "[tip-notifier] Notification loop starting (tick={:?}, max_catchup={})",
            self.config.tick_interval, self.config.max_catchup_blocks
        );

        let outcome = self.run_until_stopped(&mut shutdown).await;
        self.handle.set_state(LoopState::Terminated);

        match outcome {
            Ok(()) | Err(NotifierError::Cancelled) => {
                info!("[tip-notifier] Notification loop stopped");
                Ok(())
            }
            Err(e) => {
                error!("[tip-notifier] Notification loop terminated: {}", e);
                Err(e)
            }
        }
    }

    async fn run_until_stopped(
        &mut self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> NotifierResult<()> {
        if !self.cursor.is_set() {
            self.wait_for_genesis(shutdown).await?;
        }

        loop {
            self.handle.set_state(LoopState::Ticking);
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            cancellable_sleep(until_next_tick(self.config.tick_interval, now), shutdown).await?;
            self.tick()?;
        }
    }

    async fn wait_for_genesis(
        &mut self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> NotifierResult<()> {
        self.handle.set_state(LoopState::WaitingForGenesis);
        loop {
            let genesis = self.state.lock().genesis();
            if let Some(genesis) = genesis {
                debug!("[tip-notifier] Genesis loaded: {}", hash_hex(&genesis.hash));
                self.advance_cursor(&genesis);
                return Ok(());
            }
            cancellable_sleep(self.config.genesis_poll_interval, shutdown).await?;
        }
    }

    /// Plan under the chain-state lock, then deliver without it.
    ///
    /// A no-op before the cursor is set. When block delivery fails, the
    /// conflicts and mempool additions not yet delivered go back to the
    /// mempool view so a later tick delivers them.
    pub fn tick(&mut self) -> NotifierResult<TickSummary> {
        let Some(cursor) = self.cursor.get().cloned() else {
            return Ok(TickSummary::default());
        };

        let mut plan = {
            let mut state = self.state.lock();
            self.planner.plan(&mut *state, &cursor)
        };

        let mut summary = TickSummary::default();
        if let Err(e) = self.deliver_blocks(&mut plan, &mut summary) {
            self.requeue_undelivered(plan);
            return Err(e);
        }

        self.handle.set_state(LoopState::NotifyingMempool);
        let (notified, failures) = self.notify_mempool(&plan.mempool_additions);
        summary.mempool_notified = notified;
        summary.mempool_failures = failures;

        if self.config.record_sequences {
            if let Some(sequence) = plan.chain_notified_sequence {
                self.sequences.set_chain_notified(sequence);
            }
            if plan.mempool_additions.sequence > 0 {
                self.sequences
                    .set_mempool_notified(plan.mempool_additions.sequence);
            }
        }

        self.handle.record_tick();
        self.handle.set_state(LoopState::Ticking);
        metrics::record_tick();
        summary.notified_tip = self.cursor.get().map(NotifiedTip::from);

        if summary.disconnected > 0 || summary.connected > 0 {
            debug!(
                "[tip-notifier] Tick delivered: -{} +{} blocks, {} mempool txs, tip={:?}",
                summary.disconnected,
                summary.connected,
                summary.mempool_notified,
                summary.notified_tip.map(|t| t.height)
            );
        }
        Ok(summary)
    }

    fn deliver_blocks(
        &mut self,
        plan: &mut ReplayPlan,
        summary: &mut TickSummary,
    ) -> NotifierResult<()> {
        self.handle.set_state(LoopState::Disconnecting);
        for block in std::mem::take(&mut plan.disconnects) {
            self.notify_disconnect(&block)?;
            summary.disconnected += 1;
        }

        self.handle.set_state(LoopState::Connecting);
        while let Some(entry) = plan.next_connect() {
            if let Err(e) = self.notify_connect(&entry) {
                plan.connect_stack.push(entry);
                return Err(e);
            }
            summary.connected += 1;
        }
        Ok(())
    }

    /// Hand back the conflict records and mempool additions a failed tick
    /// took but never delivered, so the next plan picks them up again.
    fn requeue_undelivered(&self, plan: ReplayPlan) {
        let undelivered = plan.connect_stack.len();
        let mut state = self.state.lock();
        for entry in plan.connect_stack {
            state.restore_recently_conflicted(&entry.block, entry.conflicted, entry.sequence);
        }
        if !plan.mempool_additions.transactions.is_empty() {
            state.restore_recently_added(plan.mempool_additions.transactions);
        }
        debug!(
            "[tip-notifier] Requeued {} undelivered connects after failed tick",
            undelivered
        );
    }

    fn notify_disconnect(&mut self, index: &ChainIndexRef) -> NotifierResult<()> {
        let block = self.read_block(index, ReplayPhase::Disconnect)?;

        // Confirmed to unconfirmed or conflicted.
        for tx in &block.transactions {
            self.bus.sync_transaction(tx, None)?;
        }
        self.bus.chain_tip(index, &block, None)?;

        metrics::record_block_disconnected();
        match index.prev() {
            Some(prev) => self.advance_cursor(prev),
            None => warn!(
                "[tip-notifier] Disconnected genesis block at height {}",
                index.height
            ),
        }
        Ok(())
    }

    fn notify_connect(&mut self, entry: &ReplayEntry) -> NotifierResult<()> {
        let block = self.read_block(&entry.block, ReplayPhase::Connect)?;

        for tx in &entry.conflicted {
            self.bus.sync_transaction(tx, None)?;
        }
        for tx in &block.transactions {
            self.bus.sync_transaction(tx, Some(&block))?;
        }
        self.bus.chain_tip(&entry.block, &block, Some(&entry.trees))?;

        metrics::record_block_connected();
        self.advance_cursor(&entry.block);
        Ok(())
    }

    /// Deliver mempool additions; failures are logged and skipped.
    fn notify_mempool(&self, additions: &MempoolAdditions) -> (usize, usize) {
        let mut failures = 0;
        for tx in &additions.transactions {
            if let Err(e) = self.bus.sync_transaction(tx, None) {
                warn!(
                    "[tip-notifier] Mempool notification failed for {}: {}",
                    hash_hex(&tx.txid()),
                    e
                );
                metrics::record_listener_failure();
                failures += 1;
            }
        }
        let notified = additions.transactions.len() - failures;
        metrics::record_mempool_notified(notified as u64);
        (notified, failures)
    }

    fn read_block(&self, index: &ChainIndexRef, phase: ReplayPhase) -> NotifierResult<Block> {
        self.blocks
            .read_block(index)
            .map_err(|source| self.storage_failure(index, phase, source))
    }

    fn storage_failure(
        &self,
        index: &ChainIndexRef,
        phase: ReplayPhase,
        source: StorageError,
    ) -> NotifierError {
        let hash = hash_hex(&index.hash);
        error!(
            "[tip-notifier] *** Failed to read block {} while notifying listeners of block {}: {}",
            hash, phase, source
        );
        self.process.request_fatal_shutdown(FATAL_ERROR_MESSAGE);
        NotifierError::FatalStorageInconsistency {
            height: index.height,
            hash,
            phase,
            source,
        }
    }

    fn advance_cursor(&mut self, tip: &ChainIndexRef) {
        self.cursor.advance_to(tip);
        self.handle.set_last_notified(NotifiedTip::from(tip));
        metrics::set_notified_height(tip.height);
    }
}

/// Time from `now_since_epoch` to the next multiple of `interval`.
///
/// A time already on a boundary waits a full interval.
pub fn until_next_tick(interval: Duration, now_since_epoch: Duration) -> Duration {
    let interval_nanos = interval.as_nanos().max(1);
    let remainder = now_since_epoch.as_nanos() % interval_nanos;
    let wait = interval_nanos - remainder;
    Duration::from_nanos(u64::try_from(wait).unwrap_or(u64::MAX))
}

async fn cancellable_sleep(
    duration: Duration,
    shutdown: &mut watch::Receiver<bool>,
) -> NotifierResult<()> {
    if *shutdown.borrow() {
        return Err(NotifierError::Cancelled);
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => Ok(()),
        _ = shutdown.changed() => Err(NotifierError::Cancelled),
    }
}
