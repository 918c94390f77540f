//! # Node Runtime Library
//!
//! Exposes the runtime's modules for testing. The main entry point is the
//! `main.rs` binary.
//!
//! - `container/` - Component container and configuration
//! - `genesis/` - Genesis block creation and chain initialization
//! - `adapters/` - Port implementations for the tip notifier
//! - `warnings` - Operator-facing warning state
//! - `runtime` - Startup and shutdown sequencing

pub mod adapters;
pub mod container;
pub mod genesis;
pub mod runtime;
pub mod warnings;

pub use container::{NodeConfig, NodeContainer};
pub use runtime::NodeRuntime;
pub use warnings::{NodeWarnings, WarningTarget};
