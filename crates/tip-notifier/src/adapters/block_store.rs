use crate::ports::outbound::BlockStore;
use parking_lot::RwLock;
use shared_types::{Block, ChainIndexRef, Hash, StorageError};
use std::collections::HashMap;

/// Block bodies keyed by index hash.
pub struct InMemoryBlockStore {
    blocks: RwLock<HashMap<Hash, Block>>,
}

impl InMemoryBlockStore {
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, index_hash: Hash, block: Block) {
        self.blocks.write().insert(index_hash, block);
    }

    /// Drop a stored body; later reads of that block fail with `NotFound`.
    pub fn remove(&self, index_hash: &Hash) -> Option<Block> {
        self.blocks.write().remove(index_hash)
    }

    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

impl Default for InMemoryBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStore for InMemoryBlockStore {
    fn read_block(&self, index: &ChainIndexRef) -> Result<Block, StorageError> {
        self.blocks
            .read()
            .get(&index.hash)
            .cloned()
            .ok_or_else(|| StorageError::not_found(index.height, &index.hash))
    }
}
