//! Domain layer for the tip notifier
//!
//! - `cursor`: the last block listeners were fully notified about
//! - `plan`: per-tick replay snapshot captured under the chain-state lock
//! - `planner`: fork finding and snapshot collection
//! - `status`: progress published to readers outside the loop

pub mod cursor;
pub mod plan;
pub mod planner;
pub mod status;

pub use cursor::NotificationCursor;
pub use plan::{MempoolAdditions, ReplayEntry, ReplayPlan};
pub use planner::ReplayPlanner;
pub use status::{LoopState, NotifiedTip, NotifierHandle};
