//! # Node Container
//!
//! Owns every long-lived component and hands out shared references.
//!
//! ## Wiring
//!
//! ```text
//! InMemoryChainState ─┐
//! InMemoryBlockStore ─┼─→ NotificationLoop ──→ SignalBus ──→ listeners
//! RuntimeProcessControl ┘        │
//!                                └─→ AtomicNotifiedSequences (regtest)
//! ```

pub mod config;

pub use config::NodeConfig;

use crate::adapters::{EventLogListener, RuntimeProcessControl};
use crate::genesis::{GenesisBlock, GenesisBuilder, GenesisConfig, GenesisError};
use crate::warnings::NodeWarnings;
use parking_lot::Mutex;
use shared_bus::{ListenerHandle, SignalBus};
use shared_types::{BlockHeight, NetworkUpgrade};
use std::sync::Arc;
use tip_notifier::{
    AtomicNotifiedSequences, InMemoryBlockStore, InMemoryChainState, Network, NotificationLoop,
    SharedNodeState, ShutdownController,
};
use tracing::info;

/// Sapling (and Overwinter) activation height per network; `None` keeps the
/// upgrade inactive.
pub fn sapling_activation(network: Network) -> Option<BlockHeight> {
    match network {
        Network::Mainnet => Some(328_500),
        Network::Testnet => Some(207_500),
        Network::Regtest => None,
    }
}

/// All runtime components.
pub struct NodeContainer {
    pub config: NodeConfig,
    pub chain_state: SharedNodeState<InMemoryChainState>,
    pub block_store: Arc<InMemoryBlockStore>,
    pub signals: Arc<SignalBus>,
    pub shutdown: Arc<ShutdownController>,
    pub warnings: Arc<NodeWarnings>,
    pub sequences: Arc<AtomicNotifiedSequences>,
    pub event_log: Arc<EventLogListener>,
}

impl NodeContainer {
    pub fn new(config: NodeConfig) -> Self {
        let mut chain_state = InMemoryChainState::new();
        if let Some(height) = sapling_activation(config.network) {
            chain_state = chain_state
                .with_activation(NetworkUpgrade::Overwinter, height)
                .with_activation(NetworkUpgrade::Sapling, height);
        }

        let signals = Arc::new(SignalBus::new());
        let event_log = Arc::new(EventLogListener::new());
        let handle: ListenerHandle = event_log.clone();
        signals.register(handle);

        let warnings = Arc::new(NodeWarnings::new(config.pre_release, config.test_safe_mode));

        info!("[node] Container initialized for {:?}", config.network);

        Self {
            config,
            chain_state: Arc::new(Mutex::new(chain_state)),
            block_store: Arc::new(InMemoryBlockStore::new()),
            signals,
            shutdown: Arc::new(ShutdownController::new()),
            warnings,
            sequences: Arc::new(AtomicNotifiedSequences::new()),
            event_log,
        }
    }

    /// Build and load this network's genesis block.
    pub fn install_genesis(&self) -> Result<GenesisBlock, GenesisError> {
        let builder = GenesisBuilder::new(GenesisConfig::for_network(self.config.network));
        let mut state = self.chain_state.lock();
        builder.install(&mut state, &self.block_store)
    }

    /// A notification loop wired to this container's components.
    pub fn notification_loop(&self) -> NotificationLoop<InMemoryChainState, InMemoryBlockStore> {
        let process = Arc::new(RuntimeProcessControl::new(
            Arc::clone(&self.warnings),
            Arc::clone(&self.shutdown),
        ));
        NotificationLoop::new(
            self.config.notifier.clone(),
            Arc::clone(&self.chain_state),
            Arc::clone(&self.block_store),
            Arc::clone(&self.signals),
            process,
            self.sequences.clone(),
        )
    }

    /// Remove every listener. Called once the loop has stopped.
    pub fn teardown(&self) {
        self.signals.unregister_all();
    }
}
