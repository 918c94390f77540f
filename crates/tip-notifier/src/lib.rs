//! # Chain-Tip Notifier
//!
//! Background pipeline that keeps registered listeners (wallets, fee
//! estimators, RPC caches) consistent with the best chain and the mempool.
//!
//! ## Purpose
//!
//! Once per tick the loop reconciles the last block it notified against the
//! current best tip, replays every disconnect and connect in between, and
//! then delivers transactions newly admitted to the mempool.
//!
//! ## Locking Discipline
//!
//! | Phase | Chain-state lock | Listener calls |
//! |-------|------------------|----------------|
//! | Plan (`ReplayPlanner::plan`) | held | none |
//! | Disconnect / Connect | released | propagate failures |
//! | Mempool | released | failures logged and skipped |
//! | Record sequences (regtest) | released | none |
//!
//! The lock is never taken again between the end of planning and the next
//! sleep; listeners that need more chain context fetch it themselves.
//!
//! ## Guarantees
//!
//! | Guarantee | Enforcement Location |
//! |-----------|---------------------|
//! | Disconnects strictly decreasing in height | `domain/planner.rs` - `disconnect_path()` |
//! | Connects strictly increasing in height | `domain/plan.rs` - `next_connect()` pops a tip-first stack |
//! | At most `max_catchup_blocks` connects per tick | `domain/planner.rs` - window bound |
//! | Cursor advances only after a block's events are delivered | `service.rs` - `advance_cursor()` |
//! | Unreadable block halts the node exactly once | `service.rs` - `storage_failure()` |
//!
//! ## Loop States
//!
//! ```text
//! WaitingForGenesis → Ticking → Disconnecting → Connecting → NotifyingMempool → Ticking
//!                                     │              │
//!                                     └──────────────┴──→ Terminated
//! ```
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - In-memory chain state, block store, shutdown      │
//! │  service.rs - NotificationLoop (tokio task)                    │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - TipNotifierApi                            │
//! │  ports/outbound.rs - ChainStateView, MempoolView, BlockStore   │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/cursor.rs  - NotificationCursor                        │
//! │  domain/planner.rs - ReplayPlanner                             │
//! │  domain/plan.rs    - ReplayPlan, ReplayEntry                   │
//! │  domain/status.rs  - LoopState, NotifierHandle                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{
    AtomicNotifiedSequences, InMemoryBlockStore, InMemoryChainState, ShutdownController,
};
pub use config::{ConfigError, Network, NotifierConfig, DEFAULT_MAX_CATCHUP_BLOCKS};
pub use domain::{
    LoopState, MempoolAdditions, NotificationCursor, NotifiedTip, NotifierHandle, ReplayEntry,
    ReplayPlan, ReplayPlanner,
};
pub use error::{NotifierError, NotifierResult, ReplayPhase, FATAL_ERROR_MESSAGE};
pub use ports::{
    BlockStore, ChainStateView, MempoolView, NodeState, NotifiedSequences, ProcessControl,
    SharedNodeState, TipNotifierApi,
};
pub use service::{until_next_tick, NotificationLoop, TickSummary};
