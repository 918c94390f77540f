//! # Genesis Module
//!
//! Genesis block creation and chain initialization.
//!
//! The genesis block has:
//!
//! - Height: 0
//! - Parent hash: 32 zero bytes
//! - Sapling root: empty-tree root
//! - Timestamp: per-network constant
//!
//! ## Initialization Sequence
//!
//! 1. Build genesis with deterministic content for the network
//! 2. Store the body in the block store
//! 3. Load the index entry into chain state (releases the notifier's
//!    `WaitingForGenesis` poll)

pub mod builder;

pub use builder::{GenesisBlock, GenesisBuilder, GenesisConfig, GenesisError};
