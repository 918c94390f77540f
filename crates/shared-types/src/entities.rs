//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Chain**: `Block`, `BlockHeader`, `Transaction`
//! - **Block Index**: `BlockIndexEntry`, `ChainIndexRef`
//! - **Shielded Pools**: `NetworkUpgrade`, `SproutTree`, `SaplingTree`, `CommitmentTrees`
//! - **Validation & Mining**: `ValidationState`, `MiningScript`

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

// =============================================================================
// CLUSTER A: THE CHAIN
// =============================================================================

/// A 32-byte double-SHA256 hash.
pub type Hash = [u8; 32];

/// Transaction identifier (double-SHA256 of the raw transaction).
pub type TxId = Hash;

/// Height of a block in the best chain. Genesis is height 0.
pub type BlockHeight = u64;

/// Monotonically increasing mempool/chain progress marker.
pub type SequenceNumber = u64;

/// All-zero hash, used as the parent of genesis.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Double SHA-256, the hash used for block and transaction ids.
pub fn sha256d(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// Lowercase hex rendering of a hash for logs and messages.
pub fn hash_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// A transaction, transparent or shielded, held as its raw encoding.
///
/// The notification pipeline never looks inside a transaction; it only moves
/// it between collaborators and listeners, so the raw bytes plus the cached
/// id are all that is kept.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    txid: TxId,
    raw: Vec<u8>,
}

impl Transaction {
    /// Wrap a raw transaction encoding, computing its id.
    pub fn from_raw(raw: Vec<u8>) -> Self {
        let txid = sha256d(&raw);
        Self { txid, raw }
    }

    pub fn txid(&self) -> TxId {
        self.txid
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("txid", &hash_hex(&self.txid))
            .field("size", &self.raw.len())
            .finish()
    }
}

/// Block header fields relevant to the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockHeader {
    pub version: u32,
    /// Hash of the parent block.
    pub prev_hash: Hash,
    /// Merkle root over the transaction ids.
    pub merkle_root: Hash,
    /// Sapling commitment tree root after applying this block.
    pub final_sapling_root: Hash,
    pub time: u32,
    pub bits: u32,
    pub nonce: Hash,
}

impl BlockHeader {
    /// Block hash: double-SHA256 over the serialized header fields.
    pub fn hash(&self) -> Hash {
        let mut buf = Vec::with_capacity(4 + 32 * 4 + 8);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&self.prev_hash);
        buf.extend_from_slice(&self.merkle_root);
        buf.extend_from_slice(&self.final_sapling_root);
        buf.extend_from_slice(&self.time.to_le_bytes());
        buf.extend_from_slice(&self.bits.to_le_bytes());
        buf.extend_from_slice(&self.nonce);
        sha256d(&buf)
    }
}

/// A full block body as read back from block storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Assemble a block over `transactions`, filling in the Merkle root.
    pub fn new(
        prev_hash: Hash,
        final_sapling_root: Hash,
        time: u32,
        transactions: Vec<Transaction>,
    ) -> Self {
        let txids: Vec<TxId> = transactions.iter().map(Transaction::txid).collect();
        Self {
            header: BlockHeader {
                version: 4,
                prev_hash,
                merkle_root: merkle_root(&txids),
                final_sapling_root,
                time,
                bits: 0x1f07_ffff,
                nonce: ZERO_HASH,
            },
            transactions,
        }
    }

    pub fn hash(&self) -> Hash {
        self.header.hash()
    }
}

/// Bitcoin-style Merkle root: odd levels duplicate their last element.
pub fn merkle_root(txids: &[TxId]) -> Hash {
    if txids.is_empty() {
        return ZERO_HASH;
    }
    let mut level: Vec<Hash> = txids.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let right = pair.get(1).unwrap_or(&pair[0]);
                let mut buf = [0u8; 64];
                buf[..32].copy_from_slice(&pair[0]);
                buf[32..].copy_from_slice(right);
                sha256d(&buf)
            })
            .collect();
    }
    level[0]
}

// =============================================================================
// CLUSTER B: THE BLOCK INDEX
// =============================================================================

/// Shared handle to an entry in the best-chain index.
///
/// Entries are immutable once created and linked to their parent, so a handle
/// taken under the chain-state lock may be walked (via `prev`) after the lock
/// is released.
pub type ChainIndexRef = Arc<BlockIndexEntry>;

/// One block's position in the block index.
pub struct BlockIndexEntry {
    pub height: BlockHeight,
    pub hash: Hash,
    prev: Option<ChainIndexRef>,
    /// Sprout commitment tree root as of the start of this block.
    pub sprout_anchor: Hash,
    /// Sapling commitment tree root at the end of this block.
    pub final_sapling_root: Hash,
    pub time: u32,
}

impl BlockIndexEntry {
    /// Index entry for the genesis block.
    pub fn genesis(
        hash: Hash,
        sprout_anchor: Hash,
        final_sapling_root: Hash,
        time: u32,
    ) -> ChainIndexRef {
        Arc::new(Self {
            height: 0,
            hash,
            prev: None,
            sprout_anchor,
            final_sapling_root,
            time,
        })
    }

    /// Index entry for a block extending `parent`.
    pub fn child(
        parent: &ChainIndexRef,
        hash: Hash,
        sprout_anchor: Hash,
        final_sapling_root: Hash,
        time: u32,
    ) -> ChainIndexRef {
        Arc::new(Self {
            height: parent.height + 1,
            hash,
            prev: Some(Arc::clone(parent)),
            sprout_anchor,
            final_sapling_root,
            time,
        })
    }

    /// The parent entry, `None` only for genesis.
    pub fn prev(&self) -> Option<&ChainIndexRef> {
        self.prev.as_ref()
    }

    /// Walk back to the ancestor at `height`. Returns `self` when the height
    /// matches and `None` when `height` is above this entry.
    pub fn ancestor(self: &Arc<Self>, height: BlockHeight) -> Option<ChainIndexRef> {
        if height > self.height {
            return None;
        }
        let mut cursor = Arc::clone(self);
        while cursor.height > height {
            cursor = Arc::clone(cursor.prev.as_ref()?);
        }
        Some(cursor)
    }

    /// Two handles refer to the same block.
    pub fn is_same(&self, other: &BlockIndexEntry) -> bool {
        self.height == other.height && self.hash == other.hash
    }
}

/// Most recent block that is an ancestor of (or equal to) both `a` and `b`.
///
/// `None` means the two entries do not share a genesis block.
pub fn last_common_ancestor(a: &ChainIndexRef, b: &ChainIndexRef) -> Option<ChainIndexRef> {
    let height = a.height.min(b.height);
    let mut left = a.ancestor(height)?;
    let mut right = b.ancestor(height)?;
    while !left.is_same(&right) {
        left = Arc::clone(left.prev()?);
        right = Arc::clone(right.prev()?);
    }
    Some(left)
}

impl fmt::Debug for BlockIndexEntry {
    // Printing the parent chain would recurse down to genesis.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockIndexEntry")
            .field("height", &self.height)
            .field("hash", &hash_hex(&self.hash))
            .field("prev", &self.prev.as_ref().map(|p| hash_hex(&p.hash)))
            .finish()
    }
}

impl Drop for BlockIndexEntry {
    // Unlink iteratively so dropping the last handle to a long chain does not
    // recurse once per block.
    fn drop(&mut self) {
        let mut next = self.prev.take();
        while let Some(entry) = next {
            match Arc::try_unwrap(entry) {
                Ok(mut inner) => next = inner.prev.take(),
                Err(_) => break,
            }
        }
    }
}

// =============================================================================
// CLUSTER C: SHIELDED POOLS
// =============================================================================

/// Network upgrades that change which commitment trees are live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkUpgrade {
    Overwinter,
    Sapling,
}

/// Snapshot of the Sprout note commitment tree, identified by its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SproutTree {
    root: Hash,
}

impl SproutTree {
    pub fn new(root: Hash) -> Self {
        Self { root }
    }

    pub fn root(&self) -> Hash {
        self.root
    }
}

/// Snapshot of the Sapling note commitment tree, identified by its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SaplingTree {
    root: Hash,
}

impl SaplingTree {
    /// Root of the empty Sapling tree (depth 32, uncommitted leaves).
    pub const EMPTY_ROOT: Hash = [
        0x3e, 0x49, 0xb5, 0xf9, 0x54, 0xaa, 0x9d, 0x35, 0x45, 0xbc, 0x6c, 0x37, 0x74, 0x46, 0x61,
        0xee, 0xa4, 0x8d, 0x7c, 0x34, 0xe3, 0x00, 0x0d, 0x82, 0xb7, 0xf0, 0x01, 0x0c, 0x30, 0xf4,
        0xc2, 0xfb,
    ];

    pub fn new(root: Hash) -> Self {
        Self { root }
    }

    pub fn empty() -> Self {
        Self::new(Self::EMPTY_ROOT)
    }

    pub fn root(&self) -> Hash {
        self.root
    }
}

/// The pair of commitment trees as of the start of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentTrees {
    pub sprout: SproutTree,
    pub sapling: SaplingTree,
}

// =============================================================================
// CLUSTER D: VALIDATION & MINING
// =============================================================================

/// Outcome of block validation, as reported to `block_checked` listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationState {
    Valid,
    /// Consensus-invalid, with the DoS score assigned to the sender.
    Invalid { reason: String, dos_score: u32 },
    /// Validation could not complete (I/O, internal error).
    Error { reason: String },
}

impl ValidationState {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationState::Valid)
    }
}

/// Output script a listener supplies for newly mined coinbase outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningScript(pub Vec<u8>);
