//! Published loop status

use crate::ports::inbound::TipNotifierApi;
use parking_lot::RwLock;
use shared_types::{BlockHeight, ChainIndexRef, Hash};
use std::sync::Arc;

/// Notification loop states.
///
/// ```text
/// WaitingForGenesis → Ticking → Disconnecting → Connecting → NotifyingMempool → Ticking …
///                                     └──────────────┴─────→ Terminated (fatal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    WaitingForGenesis,
    Ticking,
    Disconnecting,
    Connecting,
    NotifyingMempool,
    Terminated,
}

/// Height and hash of the last fully notified block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifiedTip {
    pub height: BlockHeight,
    pub hash: Hash,
}

impl From<&ChainIndexRef> for NotifiedTip {
    fn from(index: &ChainIndexRef) -> Self {
        Self {
            height: index.height,
            hash: index.hash,
        }
    }
}

#[derive(Debug)]
struct NotifierStatus {
    state: LoopState,
    last_notified: Option<NotifiedTip>,
    ticks_completed: u64,
}

/// Cloneable read handle onto the loop's status. Only the loop writes.
#[derive(Clone)]
pub struct NotifierHandle {
    status: Arc<RwLock<NotifierStatus>>,
}

impl NotifierHandle {
    pub(crate) fn new(last_notified: Option<NotifiedTip>) -> Self {
        let state = if last_notified.is_some() {
            LoopState::Ticking
        } else {
            LoopState::WaitingForGenesis
        };
        Self {
            status: Arc::new(RwLock::new(NotifierStatus {
                state,
                last_notified,
                ticks_completed: 0,
            })),
        }
    }

    pub(crate) fn set_state(&self, state: LoopState) {
        self.status.write().state = state;
    }

    pub(crate) fn set_last_notified(&self, tip: NotifiedTip) {
        self.status.write().last_notified = Some(tip);
    }

    pub(crate) fn record_tick(&self) {
        self.status.write().ticks_completed += 1;
    }
}

impl TipNotifierApi for NotifierHandle {
    fn last_notified(&self) -> Option<NotifiedTip> {
        self.status.read().last_notified
    }

    fn state(&self) -> LoopState {
        self.status.read().state
    }

    fn ticks_completed(&self) -> u64 {
        self.status.read().ticks_completed
    }
}
