//! Notification cursor

use shared_types::{BlockHeight, ChainIndexRef};
use std::sync::Arc;

/// Last block whose events have been fully dispatched.
///
/// Owned by the notification loop; advanced only after a block's events
/// were delivered without error.
#[derive(Debug, Clone, Default)]
pub struct NotificationCursor {
    tip: Option<ChainIndexRef>,
}

impl NotificationCursor {
    /// Cursor before genesis is loaded.
    pub fn unset() -> Self {
        Self { tip: None }
    }

    /// Cursor resuming from a previously notified block.
    pub fn at(tip: ChainIndexRef) -> Self {
        Self { tip: Some(tip) }
    }

    pub fn get(&self) -> Option<&ChainIndexRef> {
        self.tip.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.tip.is_some()
    }

    pub fn height(&self) -> Option<BlockHeight> {
        self.tip.as_ref().map(|t| t.height)
    }

    pub(crate) fn advance_to(&mut self, tip: &ChainIndexRef) {
        self.tip = Some(Arc::clone(tip));
    }
}
