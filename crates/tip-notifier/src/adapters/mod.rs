//! Adapters for the tip notifier's outbound ports
//!
//! In-memory implementations used by the node runtime in development mode
//! and by tests. Production chain state plugs in behind the same ports.

pub mod block_store;
pub mod chain_state;
pub mod process;
pub mod sequences;

pub use block_store::InMemoryBlockStore;
pub use chain_state::InMemoryChainState;
pub use process::ShutdownController;
pub use sequences::AtomicNotifiedSequences;
