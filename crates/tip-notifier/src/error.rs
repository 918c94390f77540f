//! Error types for the tip notifier
//!
//! Three outcomes end a tick early: an unreadable block body (fatal), a
//! listener failure during block-level delivery (propagated), and a shutdown
//! request during a sleep (clean exit).

use shared_types::{BlockHeight, ListenerError, StorageError};
use thiserror::Error;

/// Which delivery phase was reading a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayPhase {
    Disconnect,
    Connect,
}

impl std::fmt::Display for ReplayPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayPhase::Disconnect => f.write_str("disconnects"),
            ReplayPhase::Connect => f.write_str("connects"),
        }
    }
}

/// Tip notifier errors
#[derive(Debug, Error)]
pub enum NotifierError {
    /// An indexed block's body could not be read. Halts the process.
    #[error("Failed to read block {hash} at height {height} while notifying listeners of block {phase}")]
    FatalStorageInconsistency {
        height: BlockHeight,
        hash: String,
        phase: ReplayPhase,
        #[source]
        source: StorageError,
    },

    /// A listener failed while handling a block-level event.
    #[error("Listener failure during block notification: {0}")]
    ListenerFailure(#[from] ListenerError),

    /// Shutdown was requested while the loop was sleeping.
    #[error("Notification loop cancelled")]
    Cancelled,
}

impl NotifierError {
    pub fn is_fatal(&self) -> bool {
        !matches!(self, NotifierError::Cancelled)
    }
}

/// Result type for tip notifier operations
pub type NotifierResult<T> = Result<T, NotifierError>;

/// Message surfaced to the user when the loop halts the node.
pub const FATAL_ERROR_MESSAGE: &str =
    "Error: A fatal internal error occurred, see debug.log for details";
