//! Ports module for the tip notifier
//!
//! - `outbound`: collaborators the loop drives (chain state, mempool, block
//!   storage, process control, sequence recording)
//! - `inbound`: read-only status published by the loop

pub mod inbound;
pub mod outbound;

pub use inbound::TipNotifierApi;
pub use outbound::{
    BlockStore, ChainStateView, MempoolView, NodeState, NotifiedSequences, ProcessControl,
    SharedNodeState,
};
