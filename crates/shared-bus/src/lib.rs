//! # Shared Bus - Signal Bus for Chain Notifications
//!
//! Process-wide registry mapping event kinds to ordered listener lists.
//!
//! ## Delivery Rules
//!
//! - Dispatch is synchronous, on the caller's task, in registration order.
//! - Each dispatch iterates a snapshot of the listeners registered when it
//!   began; registrations made during a dispatch apply to the next one.
//! - Registration is idempotent per (kind, listener identity).
//! - A listener error stops the dispatch and is returned to the caller; the
//!   bus never swallows failures.
//!
//! ```text
//! ┌──────────────────┐   dispatch(kind)   ┌──────────────┐
//! │ NotificationLoop │ ─────────────────→ │  SignalBus   │
//! └──────────────────┘                    │  [snapshot]  │
//!                                         └──────┬───────┘
//!                          ┌─────────────────────┼──────────────────┐
//!                          ↓                     ↓                  ↓
//!                      Wallet A              Wallet B         Fee estimator
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod bus;
pub mod events;
pub mod listener;

// Re-export main types
pub use bus::{ListenerHandle, SignalBus};
pub use events::EventKind;
pub use listener::ValidationListener;
