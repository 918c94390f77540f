//! # Runtime Adapters
//!
//! - `process`: `ProcessControl` for the notification loop, wired to the
//!   node's warnings and shutdown signal
//! - `event_log`: listener writing `EVENT_FLOW_JSON` lines for chain events

pub mod event_log;
pub mod process;

pub use event_log::EventLogListener;
pub use process::RuntimeProcessControl;
