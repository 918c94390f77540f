//! Driving Ports (API - Inbound)

use crate::domain::status::{LoopState, NotifiedTip};

/// Read-only view of the notification loop's published progress.
///
/// The loop is the only writer; readers see the state as of the last
/// completed step.
pub trait TipNotifierApi: Send + Sync {
    /// Last block listeners were fully notified about.
    fn last_notified(&self) -> Option<NotifiedTip>;

    fn state(&self) -> LoopState;

    fn ticks_completed(&self) -> u64;
}
