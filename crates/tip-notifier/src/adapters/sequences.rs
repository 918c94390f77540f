use crate::ports::outbound::NotifiedSequences;
use shared_types::SequenceNumber;
use std::sync::atomic::{AtomicU64, Ordering};

/// Notified sequence numbers kept in atomics.
///
/// Values only move forward; a stale write is ignored.
#[derive(Debug, Default)]
pub struct AtomicNotifiedSequences {
    chain: AtomicU64,
    mempool: AtomicU64,
}

impl AtomicNotifiedSequences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain_notified(&self) -> SequenceNumber {
        self.chain.load(Ordering::Acquire)
    }

    pub fn mempool_notified(&self) -> SequenceNumber {
        self.mempool.load(Ordering::Acquire)
    }
}

impl NotifiedSequences for AtomicNotifiedSequences {
    fn set_chain_notified(&self, sequence: SequenceNumber) {
        self.chain.fetch_max(sequence, Ordering::AcqRel);
    }

    fn set_mempool_notified(&self, sequence: SequenceNumber) {
        self.mempool.fetch_max(sequence, Ordering::AcqRel);
    }
}
