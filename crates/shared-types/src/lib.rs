//! # Shared Types Crate
//!
//! Chain entities and error types shared across the node's crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Every type that crosses a crate boundary
//!   (listener callbacks, collaborator ports) is defined here.
//! - **Immutable Index**: `BlockIndexEntry` values never change once linked
//!   into the index, so `ChainIndexRef` handles stay valid after the
//!   chain-state lock is released.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
