//! # Genesis Block Builder

use shared_types::{
    sha256d, Block, BlockIndexEntry, ChainIndexRef, SaplingTree, Transaction, ZERO_HASH,
};
use thiserror::Error;
use tip_notifier::{ChainStateView, InMemoryBlockStore, InMemoryChainState, Network};
use tracing::info;

/// Genesis block creation errors.
#[derive(Debug, Error)]
pub enum GenesisError {
    /// Chain state already has a genesis block.
    #[error("Genesis block already loaded: {0}")]
    AlreadyLoaded(String),
}

/// Genesis block configuration.
#[derive(Debug, Clone)]
pub struct GenesisConfig {
    /// Genesis timestamp (Unix seconds).
    pub timestamp: u32,

    /// Coinbase payload of the genesis transaction.
    pub coinbase_message: Vec<u8>,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self::for_network(Network::Mainnet)
    }
}

impl GenesisConfig {
    pub fn for_network(network: Network) -> Self {
        let (timestamp, message): (u32, &[u8]) = match network {
            Network::Mainnet => (1_477_641_360, b"Tip-Notify Genesis"),
            Network::Testnet => (1_477_648_033, b"Tip-Notify Testnet"),
            Network::Regtest => (1_296_688_602, b"Tip-Notify Regtest"),
        };
        Self {
            timestamp,
            coinbase_message: message.to_vec(),
        }
    }
}

/// A built genesis block and its index entry.
#[derive(Debug, Clone)]
pub struct GenesisBlock {
    pub block: Block,
    pub index: ChainIndexRef,
}

/// Builds and installs the genesis block.
pub struct GenesisBuilder {
    config: GenesisConfig,
}

impl GenesisBuilder {
    pub fn new(config: GenesisConfig) -> Self {
        Self { config }
    }

    /// Build the genesis block. Deterministic for a given config.
    pub fn build(&self) -> GenesisBlock {
        let coinbase = Transaction::from_raw(self.config.coinbase_message.clone());
        let block = Block::new(
            ZERO_HASH,
            SaplingTree::EMPTY_ROOT,
            self.config.timestamp,
            vec![coinbase],
        );
        let index = BlockIndexEntry::genesis(
            block.hash(),
            empty_sprout_root(),
            SaplingTree::EMPTY_ROOT,
            self.config.timestamp,
        );
        GenesisBlock { block, index }
    }

    /// Store the genesis body and load it into chain state.
    pub fn install(
        &self,
        state: &mut InMemoryChainState,
        store: &InMemoryBlockStore,
    ) -> Result<GenesisBlock, GenesisError> {
        if let Some(existing) = state.genesis() {
            return Err(GenesisError::AlreadyLoaded(hex::encode(existing.hash)));
        }

        let genesis = self.build();
        store.insert(genesis.index.hash, genesis.block.clone());
        state.load_genesis(ChainIndexRef::clone(&genesis.index));

        info!(
            "[node] Genesis block loaded: {}",
            hex::encode(genesis.index.hash)
        );
        Ok(genesis)
    }
}

/// Root of the empty Sprout commitment tree.
fn empty_sprout_root() -> shared_types::Hash {
    sha256d(b"sprout-empty-tree")
}
