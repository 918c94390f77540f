//! # Tip Notifier Metrics
//!
//! Prometheus metrics for the notification loop.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! tip-notifier = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `tip_notifier_blocks_connected_total` - Counter of connect notifications
//! - `tip_notifier_blocks_disconnected_total` - Counter of disconnect notifications
//! - `tip_notifier_mempool_txs_notified_total` - Counter of mempool additions delivered
//! - `tip_notifier_listener_failures_total` - Counter of listener failures in the mempool phase
//! - `tip_notifier_ticks_total` - Counter of completed ticks
//! - `tip_notifier_notified_height` - Gauge of the last fully notified block height

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_gauge, IntCounter, IntGauge};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref BLOCKS_CONNECTED: IntCounter = register_int_counter!(
        "tip_notifier_blocks_connected_total",
        "Total number of blocks notified as connected"
    )
    .expect("Failed to create BLOCKS_CONNECTED metric");

    pub static ref BLOCKS_DISCONNECTED: IntCounter = register_int_counter!(
        "tip_notifier_blocks_disconnected_total",
        "Total number of blocks notified as disconnected"
    )
    .expect("Failed to create BLOCKS_DISCONNECTED metric");

    pub static ref MEMPOOL_TXS_NOTIFIED: IntCounter = register_int_counter!(
        "tip_notifier_mempool_txs_notified_total",
        "Total number of mempool additions delivered to listeners"
    )
    .expect("Failed to create MEMPOOL_TXS_NOTIFIED metric");

    pub static ref LISTENER_FAILURES: IntCounter = register_int_counter!(
        "tip_notifier_listener_failures_total",
        "Total number of listener failures caught in the mempool phase"
    )
    .expect("Failed to create LISTENER_FAILURES metric");

    pub static ref TICKS: IntCounter = register_int_counter!(
        "tip_notifier_ticks_total",
        "Total number of completed notification ticks"
    )
    .expect("Failed to create TICKS metric");

    pub static ref NOTIFIED_HEIGHT: IntGauge = register_int_gauge!(
        "tip_notifier_notified_height",
        "Height of the last block fully notified to listeners"
    )
    .expect("Failed to create NOTIFIED_HEIGHT metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

#[cfg(feature = "metrics")]
pub fn record_block_connected() {
    BLOCKS_CONNECTED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_block_disconnected() {
    BLOCKS_DISCONNECTED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_mempool_notified(count: u64) {
    MEMPOOL_TXS_NOTIFIED.inc_by(count);
}

#[cfg(feature = "metrics")]
pub fn record_listener_failure() {
    LISTENER_FAILURES.inc();
}

#[cfg(feature = "metrics")]
pub fn record_tick() {
    TICKS.inc();
}

#[cfg(feature = "metrics")]
pub fn set_notified_height(height: u64) {
    NOTIFIED_HEIGHT.set(height as i64);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_block_connected() {}

#[cfg(not(feature = "metrics"))]
pub fn record_block_disconnected() {}

#[cfg(not(feature = "metrics"))]
pub fn record_mempool_notified(_count: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_listener_failure() {}

#[cfg(not(feature = "metrics"))]
pub fn record_tick() {}

#[cfg(not(feature = "metrics"))]
pub fn set_notified_height(_height: u64) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_callable() {
        record_block_connected();
        record_block_disconnected();
        record_mempool_notified(3);
        record_listener_failure();
        record_tick();
        set_notified_height(42);
    }
}
