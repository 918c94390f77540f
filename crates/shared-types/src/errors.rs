//! # Error Types
//!
//! Defines error types shared by collaborators and listeners.

use crate::entities::{hash_hex, BlockHeight, Hash};
use thiserror::Error;

/// Errors reported by block storage when reading a block body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Block body not found for an indexed block.
    #[error("Block not found: {hash} at height {height}")]
    NotFound { height: BlockHeight, hash: String },

    /// Block body present but unreadable.
    #[error("Block corrupted at height {height}: {reason}")]
    Corrupted { height: BlockHeight, reason: String },
}

impl StorageError {
    pub fn not_found(height: BlockHeight, hash: &Hash) -> Self {
        StorageError::NotFound {
            height,
            hash: hash_hex(hash),
        }
    }
}

/// Failure raised by a listener while handling an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    #[error("Listener {listener} failed: {reason}")]
    Failed { listener: String, reason: String },
}

impl ListenerError {
    pub fn failed(listener: impl Into<String>, reason: impl Into<String>) -> Self {
        ListenerError::Failed {
            listener: listener.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for listener callbacks.
pub type ListenerResult = Result<(), ListenerError>;
