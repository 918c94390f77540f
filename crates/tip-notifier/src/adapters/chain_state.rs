use crate::ports::outbound::{ChainStateView, MempoolView};
use shared_types::{
    BlockHeight, ChainIndexRef, Hash, NetworkUpgrade, SaplingTree, SequenceNumber, SproutTree,
    Transaction,
};
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory best chain, commitment-tree store and mempool.
///
/// Every connected block registers its Sprout anchor and final Sapling
/// root, so tree lookups for the active chain always succeed unless a
/// tree is removed with [`forget_sprout_tree`](Self::forget_sprout_tree)
/// or [`forget_sapling_tree`](Self::forget_sapling_tree).
pub struct InMemoryChainState {
    tip: Option<ChainIndexRef>,
    genesis: Option<ChainIndexRef>,
    sprout_trees: HashMap<Hash, SproutTree>,
    sapling_trees: HashMap<Hash, SaplingTree>,
    activations: HashMap<NetworkUpgrade, BlockHeight>,
    chain_sequence: SequenceNumber,
    mempool_sequence: SequenceNumber,
    recently_added: Vec<Transaction>,
    recently_conflicted: HashMap<Hash, (Vec<Transaction>, SequenceNumber)>,
}

impl InMemoryChainState {
    pub fn new() -> Self {
        let mut sapling_trees = HashMap::new();
        sapling_trees.insert(SaplingTree::EMPTY_ROOT, SaplingTree::empty());
        Self {
            tip: None,
            genesis: None,
            sprout_trees: HashMap::new(),
            sapling_trees,
            activations: HashMap::new(),
            chain_sequence: 0,
            mempool_sequence: 0,
            recently_added: Vec::new(),
            recently_conflicted: HashMap::new(),
        }
    }

    /// Activate `upgrade` from `height` onwards.
    pub fn with_activation(mut self, upgrade: NetworkUpgrade, height: BlockHeight) -> Self {
        self.activations.insert(upgrade, height);
        self
    }

    /// Load the genesis block and make it the tip.
    pub fn load_genesis(&mut self, genesis: ChainIndexRef) {
        self.register_trees(&genesis);
        self.genesis = Some(Arc::clone(&genesis));
        self.tip = Some(genesis);
    }

    /// Extend the active chain by `block`, recording `conflicted` as the
    /// mempool transactions it evicted. Returns the connection's sequence.
    ///
    /// # Panics
    ///
    /// If `block` does not extend the current tip.
    pub fn connect_tip(
        &mut self,
        block: ChainIndexRef,
        conflicted: Vec<Transaction>,
    ) -> SequenceNumber {
        let extends_tip = match (&self.tip, block.prev()) {
            (Some(tip), Some(prev)) => tip.is_same(prev),
            _ => false,
        };
        assert!(
            extends_tip,
            "block at height {} does not extend the current tip",
            block.height
        );

        self.register_trees(&block);
        self.chain_sequence += 1;
        self.recently_conflicted
            .insert(block.hash, (conflicted, self.chain_sequence));
        self.tip = Some(block);
        self.chain_sequence
    }

    /// Step the tip back to its parent. Returns the removed tip.
    pub fn disconnect_tip(&mut self) -> Option<ChainIndexRef> {
        let tip = self.tip.take()?;
        match tip.prev() {
            Some(prev) => {
                self.recently_conflicted.remove(&tip.hash);
                self.tip = Some(Arc::clone(prev));
                Some(tip)
            }
            None => {
                // Genesis stays.
                self.tip = Some(tip);
                None
            }
        }
    }

    /// Switch the active chain to end at `new_tip`, connecting every block
    /// above the fork with no conflicts.
    pub fn reorg_to(&mut self, new_tip: &ChainIndexRef) {
        let Some(tip) = self.tip.clone() else {
            return;
        };
        let fork = self.find_common_ancestor(&tip, new_tip);
        while self.tip.as_ref().is_some_and(|t| !t.is_same(&fork)) {
            self.disconnect_tip();
        }

        let mut branch = Vec::new();
        let mut cursor = Some(Arc::clone(new_tip));
        while let Some(block) = cursor {
            if block.is_same(&fork) {
                break;
            }
            cursor = block.prev().cloned();
            branch.push(block);
        }
        while let Some(block) = branch.pop() {
            self.connect_tip(block, Vec::new());
        }
    }

    /// Admit a transaction to the mempool.
    pub fn add_to_mempool(&mut self, tx: Transaction) -> SequenceNumber {
        self.mempool_sequence += 1;
        self.recently_added.push(tx);
        self.mempool_sequence
    }

    pub fn add_sprout_tree(&mut self, tree: SproutTree) {
        self.sprout_trees.insert(tree.root(), tree);
    }

    pub fn add_sapling_tree(&mut self, tree: SaplingTree) {
        self.sapling_trees.insert(tree.root(), tree);
    }

    pub fn forget_sprout_tree(&mut self, anchor: &Hash) {
        self.sprout_trees.remove(anchor);
    }

    pub fn forget_sapling_tree(&mut self, root: &Hash) {
        self.sapling_trees.remove(root);
    }

    pub fn pending_mempool_len(&self) -> usize {
        self.recently_added.len()
    }

    /// Blocks whose conflict record has not been taken yet.
    pub fn pending_conflict_records(&self) -> usize {
        self.recently_conflicted.len()
    }

    fn is_on_active_chain(&self, block: &ChainIndexRef) -> bool {
        self.tip
            .as_ref()
            .and_then(|tip| tip.ancestor(block.height))
            .is_some_and(|ancestor| ancestor.is_same(block))
    }

    fn register_trees(&mut self, block: &ChainIndexRef) {
        self.add_sprout_tree(SproutTree::new(block.sprout_anchor));
        self.add_sapling_tree(SaplingTree::new(block.final_sapling_root));
    }
}

impl Default for InMemoryChainState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainStateView for InMemoryChainState {
    fn tip(&self) -> Option<ChainIndexRef> {
        self.tip.clone()
    }

    fn genesis(&self) -> Option<ChainIndexRef> {
        self.genesis.clone()
    }

    fn sprout_tree_at(&self, anchor: &Hash) -> Option<SproutTree> {
        self.sprout_trees.get(anchor).copied()
    }

    fn sapling_tree_at(&self, root: &Hash) -> Option<SaplingTree> {
        self.sapling_trees.get(root).copied()
    }

    fn is_upgrade_active_at(&self, upgrade: NetworkUpgrade, height: BlockHeight) -> bool {
        self.activations
            .get(&upgrade)
            .is_some_and(|activation| height >= *activation)
    }

    fn chain_connected_sequence(&self) -> SequenceNumber {
        self.chain_sequence
    }
}

impl MempoolView for InMemoryChainState {
    fn drain_recently_added(&mut self) -> (Vec<Transaction>, SequenceNumber) {
        (std::mem::take(&mut self.recently_added), self.mempool_sequence)
    }

    fn take_recently_conflicted(
        &mut self,
        block: &ChainIndexRef,
    ) -> (Vec<Transaction>, SequenceNumber) {
        match self.recently_conflicted.remove(&block.hash) {
            Some(entry) => entry,
            None => (Vec::new(), self.chain_sequence),
        }
    }

    fn restore_recently_conflicted(
        &mut self,
        block: &ChainIndexRef,
        conflicted: Vec<Transaction>,
        sequence: SequenceNumber,
    ) {
        if self.is_on_active_chain(block) {
            self.recently_conflicted
                .insert(block.hash, (conflicted, sequence));
        }
    }

    fn restore_recently_added(&mut self, mut transactions: Vec<Transaction>) {
        transactions.append(&mut self.recently_added);
        self.recently_added = transactions;
    }
}
